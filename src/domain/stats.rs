use serde::{Deserialize, Serialize};

use crate::domain::payment::{Payment, PaymentStatus};

/// Running counters kept next to the payment records.
///
/// Every mutation happens inside the same critical section as the record
/// change it accounts for, so a snapshot never shows a status counter moved
/// without its amount.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PaymentCounters {
	pub total:        u64,
	pub pending:      u64,
	pub processing:   u64,
	pub completed:    u64,
	pub failed:       u64,
	pub total_amount: f64,
}

impl PaymentCounters {
	pub fn record_created(&mut self, payment: &Payment) {
		self.total += 1;
		self.increment(payment.status);
	}

	pub fn record_transition(
		&mut self,
		from: PaymentStatus,
		to: PaymentStatus,
		amount: f64,
	) {
		self.decrement(from);
		self.increment(to);

		// Only completed payments count towards the accounted amount.
		if to == PaymentStatus::Completed {
			self.total_amount += amount;
		}
	}

	pub fn snapshot(&self, active_tasks: usize) -> StatsSnapshot {
		StatsSnapshot {
			total_payments: self.total,
			pending_payments: self.pending,
			processing_payments: self.processing,
			completed_payments: self.completed,
			failed_payments: self.failed,
			total_amount: self.total_amount,
			active_tasks,
		}
	}

	fn slot(&mut self, status: PaymentStatus) -> &mut u64 {
		match status {
			PaymentStatus::Pending => &mut self.pending,
			PaymentStatus::Processing => &mut self.processing,
			PaymentStatus::Completed => &mut self.completed,
			PaymentStatus::Failed => &mut self.failed,
		}
	}

	fn increment(&mut self, status: PaymentStatus) {
		*self.slot(status) += 1;
	}

	fn decrement(&mut self, status: PaymentStatus) {
		let slot = self.slot(status);
		*slot = slot.saturating_sub(1);
	}
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StatsSnapshot {
	pub total_payments:      u64,
	pub pending_payments:    u64,
	pub processing_payments: u64,
	pub completed_payments:  u64,
	pub failed_payments:     u64,
	pub total_amount:        f64,
	pub active_tasks:        usize,
}
