use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::payment::{Payment, PaymentStatus};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotificationEvent {
	pub payment_id: Uuid,
	pub status:     PaymentStatus,
	pub amount:     f64,
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp:  OffsetDateTime,
}

impl NotificationEvent {
	pub fn for_payment(payment: &Payment, timestamp: OffsetDateTime) -> Self {
		Self {
			payment_id: payment.id,
			status: payment.status,
			amount: payment.amount,
			timestamp,
		}
	}
}

/// Destination for state-change notifications, e.g. a merchant webhook.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
	async fn deliver(
		&self,
		event: NotificationEvent,
	) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
