use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::errors::PaymentError;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::repository::PaymentRepository;
use crate::domain::stats::PaymentCounters;

#[derive(Default)]
struct Ledger {
	payments: HashMap<Uuid, Payment>,
	counters: PaymentCounters,
}

/// Unbounded in-memory payment store. Records and counters sit behind one
/// lock so every transition is observed whole.
#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
	ledger: Arc<RwLock<Ledger>>,
}

impl InMemoryPaymentRepository {
	pub fn new() -> Self {
		Self::default()
	}

	fn read(&self) -> RwLockReadGuard<'_, Ledger> {
		self.ledger.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
		self.ledger.write().unwrap_or_else(PoisonError::into_inner)
	}
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
	async fn insert(&self, payment: Payment) -> Result<(), PaymentError> {
		let mut ledger = self.write();
		let Ledger { payments, counters } = &mut *ledger;

		counters.record_created(&payment);
		payments.insert(payment.id, payment);
		Ok(())
	}

	async fn get(&self, id: Uuid) -> Result<Payment, PaymentError> {
		self.read()
			.payments
			.get(&id)
			.cloned()
			.ok_or_else(|| PaymentError::not_found(id))
	}

	async fn transition(
		&self,
		id: Uuid,
		next: PaymentStatus,
		at: OffsetDateTime,
	) -> Result<Payment, PaymentError> {
		let mut ledger = self.write();
		let Ledger { payments, counters } = &mut *ledger;

		let payment = payments
			.get_mut(&id)
			.ok_or_else(|| PaymentError::not_found(id))?;
		let from = payment.status;
		payment.transition_to(next, at)?;
		counters.record_transition(from, next, payment.amount);

		Ok(payment.clone())
	}

	async fn counters(&self) -> PaymentCounters {
		self.read().counters.clone()
	}
}
