use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter};
use log::warn;

/// Replenish interval used when no refill rate is configured.
const NO_REFILL_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// One GCRA bucket per caller key, created on first sight and never evicted.
pub struct KeyedRateLimiter<C: Clock = DefaultClock> {
	limiter: RateLimiter<String, DashMapStateStore<String>, C, NoOpMiddleware<C::Instant>>,
}

impl KeyedRateLimiter {
	pub fn new(refill_per_second: f64, burst: u32) -> Self {
		Self::with_clock(refill_per_second, burst, &DefaultClock::default())
	}
}

impl<C: Clock> KeyedRateLimiter<C> {
	pub fn with_clock(refill_per_second: f64, burst: u32, clock: &C) -> Self {
		Self {
			limiter: RateLimiter::dashmap_with_clock(
				quota(refill_per_second, burst),
				clock,
			),
		}
	}

	/// Takes one cell from `key`'s bucket if one is available. Never waits.
	pub fn allow(&self, key: &str) -> bool {
		self.limiter.check_key(&key.to_owned()).is_ok()
	}

	pub fn active_keys(&self) -> usize {
		self.limiter.len()
	}
}

/// Buckets start full with `burst` cells and regain one every
/// `1 / refill_per_second` seconds.
fn quota(refill_per_second: f64, burst: u32) -> Quota {
	let burst = NonZeroU32::new(burst).unwrap_or_else(|| {
		warn!("Rate limit burst of 0 is not supported, using 1");
		NonZeroU32::MIN
	});

	let period = if refill_per_second.is_finite() && refill_per_second > 0.0 {
		Duration::try_from_secs_f64(refill_per_second.recip())
			.map_or(NO_REFILL_PERIOD, |period| period.min(NO_REFILL_PERIOD))
	} else {
		NO_REFILL_PERIOD
	};

	Quota::with_period(period)
		.unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX))
		.allow_burst(burst)
}
