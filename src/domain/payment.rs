use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::errors::PaymentError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
	#[display("pending")]
	Pending,
	#[display("processing")]
	Processing,
	#[display("completed")]
	Completed,
	#[display("failed")]
	Failed,
}

impl PaymentStatus {
	pub fn is_terminal(&self) -> bool {
		matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
	}

	/// `Pending -> Processing -> {Completed, Failed}`; nothing leaves a
	/// terminal state.
	pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
		matches!(
			(self, next),
			(PaymentStatus::Pending, PaymentStatus::Processing) |
				(PaymentStatus::Processing, PaymentStatus::Completed) |
				(PaymentStatus::Processing, PaymentStatus::Failed)
		)
	}
}

/// A payment as requested by a caller, before it has an identity.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NewPayment {
	pub user_id:     String,
	pub amount:      f64,
	pub currency:    String,
	pub description: String,
}

impl NewPayment {
	pub fn validate(&self) -> Result<(), PaymentError> {
		if self.user_id.trim().is_empty() {
			return Err(PaymentError::validation("user_id is required"));
		}

		if !self.amount.is_finite() || self.amount <= 0.0 {
			return Err(PaymentError::validation("amount must be greater than 0"));
		}

		let currency = self.currency.trim();
		if currency.chars().count() != 3 ||
			!currency.chars().all(|c| c.is_ascii_alphabetic())
		{
			return Err(PaymentError::validation(
				"currency must be 3-letter code (e.g., USD, THB)",
			));
		}

		Ok(())
	}
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Payment {
	pub id:           Uuid,
	pub user_id:      String,
	pub amount:       f64,
	pub currency:     String,
	pub description:  String,
	pub status:       PaymentStatus,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at:   OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at:   OffsetDateTime,
	#[serde(
		with = "time::serde::rfc3339::option",
		skip_serializing_if = "Option::is_none",
		default
	)]
	pub processed_at: Option<OffsetDateTime>,
}

impl Payment {
	/// Builds a `Pending` payment from a validated request.
	pub fn create(
		request: NewPayment,
		now: OffsetDateTime,
	) -> Result<Self, PaymentError> {
		request.validate()?;

		Ok(Payment {
			id:           Uuid::new_v4(),
			user_id:      request.user_id.trim().to_string(),
			amount:       request.amount,
			currency:     request.currency.trim().to_ascii_uppercase(),
			description:  request.description,
			status:       PaymentStatus::Pending,
			created_at:   now,
			updated_at:   now,
			processed_at: None,
		})
	}

	/// Moves the payment along the state machine, stamping `updated_at` and,
	/// on completion, `processed_at`.
	pub fn transition_to(
		&mut self,
		next: PaymentStatus,
		at: OffsetDateTime,
	) -> Result<(), PaymentError> {
		if !self.status.can_transition_to(next) {
			return Err(PaymentError::InvalidTransition {
				from: self.status,
				to:   next,
			});
		}

		// Wall clocks can step backwards; updated_at never precedes created_at.
		let at = at.max(self.updated_at);

		self.status = next;
		self.updated_at = at;
		if next == PaymentStatus::Completed {
			self.processed_at = Some(at);
		}

		Ok(())
	}
}
