use derive_more::derive::{Display, Error};

use crate::domain::payment::PaymentStatus;

/// Failures the payment engine reports to its callers.
///
/// `QueueFull` is transient and worth retrying; `PoolClosed` is final for the
/// lifetime of the process.
#[derive(Debug, Display, Error, Clone, PartialEq)]
pub enum PaymentError {
	#[display("Validation failed: {message}")]
	Validation { message: String },
	#[display("Task queue is full")]
	QueueFull,
	#[display("Worker pool is shutting down")]
	PoolClosed,
	#[display("Payment not found: {id}")]
	NotFound { id: String },
	#[display("Invalid payment transition from {from} to {to}")]
	InvalidTransition {
		from: PaymentStatus,
		to:   PaymentStatus,
	},
}

impl PaymentError {
	pub fn validation(message: impl Into<String>) -> Self {
		PaymentError::Validation {
			message: message.into(),
		}
	}

	pub fn not_found(id: impl ToString) -> Self {
		PaymentError::NotFound { id: id.to_string() }
	}

	pub fn is_retryable(&self) -> bool {
		matches!(self, PaymentError::QueueFull)
	}
}
