use std::sync::Arc;

use log::{info, warn};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::errors::PaymentError;
use crate::domain::gateway::{ChargeOutcome, PaymentGateway};
use crate::domain::notification::NotificationEvent;
use crate::domain::payment::PaymentStatus;
use crate::domain::repository::PaymentRepository;
use crate::infrastructure::notifications::notification_dispatcher::NotificationDispatcher;

/// Drives one payment from `Pending` to a terminal state. Runs inside a pool
/// worker; a missing record is a defect and is returned as an error for the
/// worker to log.
pub struct ProcessPaymentUseCase<R: PaymentRepository, G: PaymentGateway> {
	payment_repo: R,
	gateway:      G,
	notifier:     Arc<NotificationDispatcher>,
}

impl<R: PaymentRepository, G: PaymentGateway> ProcessPaymentUseCase<R, G> {
	pub fn new(
		payment_repo: R,
		gateway: G,
		notifier: Arc<NotificationDispatcher>,
	) -> Self {
		Self {
			payment_repo,
			gateway,
			notifier,
		}
	}

	pub async fn execute(
		&self,
		payment_id: Uuid,
	) -> Result<PaymentStatus, PaymentError> {
		let payment = self
			.payment_repo
			.transition(
				payment_id,
				PaymentStatus::Processing,
				OffsetDateTime::now_utc(),
			)
			.await?;

		info!("Processing payment: {payment_id}");

		let next = match self.gateway.charge(&payment).await {
			ChargeOutcome::Approved => PaymentStatus::Completed,
			ChargeOutcome::Declined => PaymentStatus::Failed,
		};

		let settled = self
			.payment_repo
			.transition(payment_id, next, OffsetDateTime::now_utc())
			.await?;

		match settled.status {
			PaymentStatus::Completed => info!("Payment completed: {payment_id}"),
			_ => warn!("Payment failed: {payment_id}"),
		}

		self.notifier.enqueue(NotificationEvent::for_payment(
			&settled,
			OffsetDateTime::now_utc(),
		));

		Ok(settled.status)
	}
}
