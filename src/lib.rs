use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use log::info;

use crate::adapters::web::health_handler::ServiceUptime;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::gateway::simulated_payment_gateway::SimulatedPaymentGateway;
use crate::infrastructure::notifications::notification_dispatcher::NotificationDispatcher;
use crate::infrastructure::notifications::simulated_webhook_sink::SimulatedWebhookSink;
use crate::infrastructure::persistence::in_memory_payment_repository::InMemoryPaymentRepository;
use crate::infrastructure::rate_limiting::keyed_rate_limiter::KeyedRateLimiter;
use crate::infrastructure::workers::worker_pool::WorkerPool;
use crate::use_cases::create_payment::CreatePaymentUseCase;
use crate::use_cases::get_payment::GetPaymentUseCase;
use crate::use_cases::get_stats::GetStatsUseCase;
use crate::use_cases::process_payment::ProcessPaymentUseCase;

pub mod domain {
	pub mod errors;
	pub mod gateway;
	pub mod notification;
	pub mod payment;
	pub mod repository;
	pub mod stats;
}

pub mod use_cases {
	pub mod create_payment;
	pub mod dto;
	pub mod get_payment;
	pub mod get_stats;
	pub mod process_payment;
}

pub mod infrastructure {
	pub mod config {
		pub mod settings;
	}

	pub mod gateway {
		pub mod simulated_payment_gateway;
	}

	pub mod notifications {
		pub mod notification_dispatcher;
		pub mod simulated_webhook_sink;
	}

	pub mod persistence {
		pub mod in_memory_payment_repository;
	}

	pub mod rate_limiting {
		pub mod keyed_rate_limiter;
	}

	pub mod workers {
		pub mod worker_pool;
	}
}

pub mod adapters {
	pub mod web {
		pub mod errors;
		pub mod health_handler;
		pub mod payments_handler;
		pub mod rate_limit;
		pub mod routes;
		pub mod schema;
	}
}

/// Wires the engine, serves HTTP until actix receives a stop signal, then
/// drains the worker pool and stops the notification dispatcher.
pub async fn run(config: Arc<Config>) -> std::io::Result<()> {
	let worker_pool = Arc::new(WorkerPool::new(
		config.worker_count,
		config.queue_capacity,
	));
	worker_pool.start();

	let notifier = Arc::new(NotificationDispatcher::start(
		config.notification_buffer_capacity,
		Arc::new(SimulatedWebhookSink::new(config.notification_delay())),
	));

	let (min_delay, max_delay) = config.processing_delay();
	let payment_repo = InMemoryPaymentRepository::new();
	let process_payment_use_case = Arc::new(ProcessPaymentUseCase::new(
		payment_repo.clone(),
		SimulatedPaymentGateway::new(
			config.payment_success_rate,
			min_delay,
			max_delay,
		),
		Arc::clone(&notifier),
	));

	let create_payment_use_case = web::Data::new(CreatePaymentUseCase::new(
		payment_repo.clone(),
		Arc::clone(&worker_pool),
		process_payment_use_case,
	));
	let get_payment_use_case =
		web::Data::new(GetPaymentUseCase::new(payment_repo.clone()));
	let get_stats_use_case = web::Data::new(GetStatsUseCase::new(
		payment_repo,
		Arc::clone(&worker_pool),
		Arc::clone(&notifier),
	));
	let rate_limiter = web::Data::new(KeyedRateLimiter::new(
		config.rate_limit_per_second,
		config.rate_limit_burst,
	));
	let pool_data = web::Data::from(Arc::clone(&worker_pool));
	let uptime = web::Data::new(ServiceUptime::start());

	info!(
		"Rate limiter initialized: {} req/s, burst {}",
		config.rate_limit_per_second, config.rate_limit_burst
	);
	info!(
		"Starting Actix-Web server on {}:{}...",
		config.server_host, config.server_port
	);

	let server = HttpServer::new(move || {
		App::new()
			.app_data(create_payment_use_case.clone())
			.app_data(get_payment_use_case.clone())
			.app_data(get_stats_use_case.clone())
			.app_data(rate_limiter.clone())
			.app_data(pool_data.clone())
			.app_data(uptime.clone())
			.configure(adapters::web::routes::configure)
	})
	.keep_alive(Duration::from_secs(config.server_keepalive))
	.bind((config.server_host.as_str(), config.server_port));

	let result = match server {
		Ok(server) => server.run().await,
		Err(e) => Err(e),
	};

	info!("HTTP server stopped, draining payment engine...");
	worker_pool.shutdown().await;
	notifier.shutdown().await;
	info!("Payment engine shut down");

	result
}
