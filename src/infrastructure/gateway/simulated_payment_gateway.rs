use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use rand::Rng;
use tokio::time::sleep;

use crate::domain::gateway::{ChargeOutcome, PaymentGateway};
use crate::domain::payment::Payment;

/// Pretends to call a payment provider: a random delay in
/// `[min_delay, max_delay]` followed by a weighted coin flip.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentGateway {
	success_rate: f64,
	min_delay:    Duration,
	max_delay:    Duration,
}

impl SimulatedPaymentGateway {
	pub fn new(success_rate: f64, min_delay: Duration, max_delay: Duration) -> Self {
		let success_rate = if success_rate.is_nan() {
			0.0
		} else {
			success_rate.clamp(0.0, 1.0)
		};

		Self {
			success_rate,
			min_delay,
			max_delay: max_delay.max(min_delay),
		}
	}

	fn draw(&self) -> (Duration, ChargeOutcome) {
		let mut rng = rand::thread_rng();

		let delay = if self.max_delay > self.min_delay {
			rng.gen_range(self.min_delay..=self.max_delay)
		} else {
			self.min_delay
		};
		let outcome = if rng.gen_bool(self.success_rate) {
			ChargeOutcome::Approved
		} else {
			ChargeOutcome::Declined
		};

		(delay, outcome)
	}
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
	async fn charge(&self, payment: &Payment) -> ChargeOutcome {
		let (delay, outcome) = self.draw();
		debug!(
			"Charging payment {} ({:.2} {}), simulated latency {delay:?}",
			payment.id, payment.amount, payment.currency
		);

		sleep(delay).await;
		outcome
	}
}
