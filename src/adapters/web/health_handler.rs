use std::time::Instant;

use actix_web::{HttpResponse, Responder, get, web};
use time::OffsetDateTime;

use crate::adapters::web::routes::AppGetStatsUseCase;
use crate::adapters::web::schema::{HealthResponse, RateLimiterHealth, WorkerPoolHealth};
use crate::infrastructure::rate_limiting::keyed_rate_limiter::KeyedRateLimiter;
use crate::infrastructure::workers::worker_pool::WorkerPool;

#[derive(Debug, Clone, Copy)]
pub struct ServiceUptime {
	started_at: Instant,
}

impl ServiceUptime {
	pub fn start() -> Self {
		Self {
			started_at: Instant::now(),
		}
	}
}

#[get("/health")]
pub async fn health(
	uptime: web::Data<ServiceUptime>,
	worker_pool: web::Data<WorkerPool>,
	rate_limiter: web::Data<KeyedRateLimiter>,
	get_stats_use_case: web::Data<AppGetStatsUseCase>,
) -> impl Responder {
	let status = if worker_pool.is_closed() {
		"shutting_down"
	} else {
		"healthy"
	};

	HttpResponse::Ok().json(HealthResponse {
		status:         status.to_string(),
		timestamp:      OffsetDateTime::now_utc(),
		uptime_seconds: uptime.started_at.elapsed().as_secs(),
		payments:       get_stats_use_case.execute().await,
		workers:        WorkerPoolHealth {
			worker_count:   worker_pool.worker_count(),
			busy_workers:   worker_pool.busy_workers(),
			queue_length:   worker_pool.queue_length(),
			queue_capacity: worker_pool.queue_capacity(),
		},
		rate_limiter:   RateLimiterHealth {
			active_keys: rate_limiter.active_keys(),
		},
	})
}
