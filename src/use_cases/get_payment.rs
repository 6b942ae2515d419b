use uuid::Uuid;

use crate::domain::errors::PaymentError;
use crate::domain::payment::Payment;
use crate::domain::repository::PaymentRepository;

#[derive(Clone)]
pub struct GetPaymentUseCase<R: PaymentRepository> {
	payment_repo: R,
}

impl<R: PaymentRepository> GetPaymentUseCase<R> {
	pub fn new(payment_repo: R) -> Self {
		Self { payment_repo }
	}

	/// Ids that are not UUIDs cannot name a payment and report `NotFound`.
	pub async fn execute(&self, payment_id: &str) -> Result<Payment, PaymentError> {
		let id = Uuid::parse_str(payment_id.trim())
			.map_err(|_| PaymentError::not_found(payment_id))?;

		self.payment_repo.get(id).await
	}
}
