use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::payment::Payment;
use crate::domain::stats::StatsSnapshot;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentRequest {
	pub user_id:     String,
	pub amount:      f64,
	pub currency:    String,
	#[serde(default)]
	pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentResponse {
	pub payment: Payment,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatsResponse {
	pub stats: StatsSnapshot,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthResponse {
	pub status:         String,
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp:      OffsetDateTime,
	pub uptime_seconds: u64,
	pub payments:       StatsSnapshot,
	pub workers:        WorkerPoolHealth,
	pub rate_limiter:   RateLimiterHealth,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorkerPoolHealth {
	pub worker_count:   usize,
	pub busy_workers:   usize,
	pub queue_length:   usize,
	pub queue_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimiterHealth {
	pub active_keys: usize,
}
