use async_trait::async_trait;

use crate::domain::payment::Payment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
	Approved,
	Declined,
}

/// The external system that settles a payment. Implementations may take as
/// long as they need; the calling worker is held for the whole call.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
	async fn charge(&self, payment: &Payment) -> ChargeOutcome;
}
