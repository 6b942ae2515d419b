use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment::{NewPayment, PaymentStatus};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CreatePaymentCommand {
	pub user_id:     String,
	pub amount:      f64,
	pub currency:    String,
	pub description: String,
}

impl From<CreatePaymentCommand> for NewPayment {
	fn from(command: CreatePaymentCommand) -> Self {
		NewPayment {
			user_id:     command.user_id,
			amount:      command.amount,
			currency:    command.currency,
			description: command.description,
		}
	}
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CreatePaymentReceipt {
	pub payment_id: Uuid,
	#[serde(rename = "payment_status")]
	pub status:     PaymentStatus,
	pub message:    String,
}
