use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
	pub server_host: String,
	pub server_port: u16,
	pub server_keepalive: u64,
	pub worker_count: usize,
	pub queue_capacity: usize,
	pub rate_limit_per_second: f64,
	pub rate_limit_burst: u32,
	pub notification_buffer_capacity: usize,
	pub notification_delay_ms: u64,
	pub processing_min_delay_ms: u64,
	pub processing_max_delay_ms: u64,
	pub payment_success_rate: f64,
}

impl Config {
	/// Built-in defaults overridden by `APP_*` environment variables.
	pub fn load() -> Result<Self, config::ConfigError> {
		let config_builder = config::Config::builder()
			.set_default("server_host", "0.0.0.0")?
			.set_default("server_port", 3000_i64)?
			.set_default("server_keepalive", 75_i64)?
			.set_default("worker_count", 10_i64)?
			.set_default("queue_capacity", 100_i64)?
			.set_default("rate_limit_per_second", 10.0)?
			.set_default("rate_limit_burst", 10_i64)?
			.set_default("notification_buffer_capacity", 50_i64)?
			.set_default("notification_delay_ms", 500_i64)?
			.set_default("processing_min_delay_ms", 2000_i64)?
			.set_default("processing_max_delay_ms", 4000_i64)?
			.set_default("payment_success_rate", 0.9)?
			.add_source(config::Environment::with_prefix("APP"))
			.build()?;

		config_builder.try_deserialize()
	}

	pub fn processing_delay(&self) -> (Duration, Duration) {
		(
			Duration::from_millis(self.processing_min_delay_ms),
			Duration::from_millis(self.processing_max_delay_ms),
		)
	}

	pub fn notification_delay(&self) -> Duration {
		Duration::from_millis(self.notification_delay_ms)
	}
}
