use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::errors::PaymentError;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::stats::PaymentCounters;

/// Storage for payment records and the counters derived from them.
///
/// Implementations must apply a record change and its counter update as one
/// atomic step. Retention is up to the implementation; the in-memory store
/// keeps everything.
#[async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
	async fn insert(&self, payment: Payment) -> Result<(), PaymentError>;
	async fn get(&self, id: Uuid) -> Result<Payment, PaymentError>;
	async fn transition(
		&self,
		id: Uuid,
		next: PaymentStatus,
		at: OffsetDateTime,
	) -> Result<Payment, PaymentError>;
	async fn counters(&self) -> PaymentCounters;
}
