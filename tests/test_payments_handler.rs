use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::RETRY_AFTER;
use actix_web::{App, test, web};
use payment_engine::adapters::web::health_handler::ServiceUptime;
use payment_engine::adapters::web::rate_limit::USER_ID_HEADER;
use payment_engine::adapters::web::routes::{
	self, AppCreatePaymentUseCase, AppGetPaymentUseCase, AppGetStatsUseCase,
};
use payment_engine::adapters::web::schema::{
	HealthResponse, PaymentRequest, PaymentResponse, StatsResponse,
};
use payment_engine::domain::payment::PaymentStatus;
use payment_engine::infrastructure::gateway::simulated_payment_gateway::SimulatedPaymentGateway;
use payment_engine::infrastructure::notifications::notification_dispatcher::NotificationDispatcher;
use payment_engine::infrastructure::notifications::simulated_webhook_sink::SimulatedWebhookSink;
use payment_engine::infrastructure::persistence::in_memory_payment_repository::InMemoryPaymentRepository;
use payment_engine::infrastructure::rate_limiting::keyed_rate_limiter::KeyedRateLimiter;
use payment_engine::infrastructure::workers::worker_pool::WorkerPool;
use payment_engine::use_cases::create_payment::CreatePaymentUseCase;
use payment_engine::use_cases::dto::CreatePaymentReceipt;
use payment_engine::use_cases::get_payment::GetPaymentUseCase;
use payment_engine::use_cases::get_stats::GetStatsUseCase;
use payment_engine::use_cases::process_payment::ProcessPaymentUseCase;
use serde_json::Value;
use uuid::Uuid;

struct Fixture {
	worker_pool: Arc<WorkerPool>,
	notifier:    Arc<NotificationDispatcher>,
	create:      web::Data<AppCreatePaymentUseCase>,
	get:         web::Data<AppGetPaymentUseCase>,
	stats:       web::Data<AppGetStatsUseCase>,
	limiter:     web::Data<KeyedRateLimiter>,
	uptime:      web::Data<ServiceUptime>,
}

impl Fixture {
	fn new(rate_per_second: f64, burst: u32) -> Self {
		let worker_pool = Arc::new(WorkerPool::new(2, 16));
		worker_pool.start();
		let notifier = Arc::new(NotificationDispatcher::start(
			16,
			Arc::new(SimulatedWebhookSink::new(Duration::ZERO)),
		));
		let payment_repo = InMemoryPaymentRepository::new();
		let processor = Arc::new(ProcessPaymentUseCase::new(
			payment_repo.clone(),
			SimulatedPaymentGateway::new(1.0, Duration::ZERO, Duration::ZERO),
			Arc::clone(&notifier),
		));

		Self {
			create: web::Data::new(CreatePaymentUseCase::new(
				payment_repo.clone(),
				Arc::clone(&worker_pool),
				processor,
			)),
			get: web::Data::new(GetPaymentUseCase::new(payment_repo.clone())),
			stats: web::Data::new(GetStatsUseCase::new(
				payment_repo,
				Arc::clone(&worker_pool),
				Arc::clone(&notifier),
			)),
			limiter: web::Data::new(KeyedRateLimiter::new(rate_per_second, burst)),
			uptime: web::Data::new(ServiceUptime::start()),
			worker_pool,
			notifier,
		}
	}

	async fn shutdown(&self) {
		self.worker_pool.shutdown().await;
		self.notifier.shutdown().await;
	}
}

macro_rules! init_app {
	($fixture:expr) => {
		test::init_service(
			App::new()
				.app_data($fixture.create.clone())
				.app_data($fixture.get.clone())
				.app_data($fixture.stats.clone())
				.app_data($fixture.limiter.clone())
				.app_data(web::Data::from(Arc::clone(&$fixture.worker_pool)))
				.app_data($fixture.uptime.clone())
				.configure(routes::configure),
		)
		.await
	};
}

fn payment_request(user_id: &str, amount: f64, currency: &str) -> PaymentRequest {
	PaymentRequest {
		user_id:     user_id.to_string(),
		amount,
		currency:    currency.to_string(),
		description: "Order #1234".to_string(),
	}
}

fn post_payment(user_id: &str, amount: f64, currency: &str) -> test::TestRequest {
	test::TestRequest::post()
		.uri("/api/v1/payments")
		.insert_header((USER_ID_HEADER, user_id))
		.set_json(payment_request(user_id, amount, currency))
}

#[actix_web::test]
async fn test_create_payment_returns_created_and_is_readable() {
	let fixture = Fixture::new(100.0, 100);
	let app = init_app!(fixture);

	let resp = test::call_service(&app, post_payment("u1", 100.51, "thb").to_request()).await;
	assert_eq!(resp.status(), StatusCode::CREATED);
	let body: Value = test::read_body_json(resp).await;
	assert_eq!(body["payment_status"], "pending");
	let receipt: CreatePaymentReceipt = serde_json::from_value(body).unwrap();
	assert_eq!(receipt.status, PaymentStatus::Pending);
	assert_eq!(receipt.message, "Payment queued for processing");

	let req = test::TestRequest::get()
		.uri(&format!("/api/v1/payments/{}", receipt.payment_id))
		.insert_header((USER_ID_HEADER, "u1"))
		.to_request();
	let resp = test::call_service(&app, req).await;
	assert_eq!(resp.status(), StatusCode::OK);

	let body: PaymentResponse = test::read_body_json(resp).await;
	assert_eq!(body.payment.id, receipt.payment_id);
	assert_eq!(body.payment.amount, 100.51);
	assert_eq!(body.payment.currency, "THB");
	assert_eq!(body.payment.description, "Order #1234");

	fixture.shutdown().await;
}

#[actix_web::test]
async fn test_create_payment_rejects_invalid_input() {
	let fixture = Fixture::new(100.0, 100);
	let app = init_app!(fixture);

	let resp = test::call_service(&app, post_payment("u1", 10.0, "DOLLARS").to_request()).await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	let body: Value = test::read_body_json(resp).await;
	assert_eq!(body["statusCode"], 400);
	assert_eq!(body["message"], "currency must be 3-letter code (e.g., USD, THB)");

	let resp = test::call_service(&app, post_payment("u1", -1.0, "USD").to_request()).await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	let req = test::TestRequest::post()
		.uri("/api/v1/payments")
		.insert_header((USER_ID_HEADER, "u1"))
		.set_json(serde_json::json!({ "user_id": "u1", "amount": "ten", "currency": "USD" }))
		.to_request();
	let resp = test::call_service(&app, req).await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	let body: Value = test::read_body_json(resp).await;
	assert_eq!(body["statusCode"], 400);
	assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));

	assert_eq!(fixture.stats.execute().await.total_payments, 0);
	fixture.shutdown().await;
}

#[actix_web::test]
async fn test_get_unknown_payment_returns_not_found() {
	let fixture = Fixture::new(100.0, 100);
	let app = init_app!(fixture);

	for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
		let req = test::TestRequest::get()
			.uri(&format!("/api/v1/payments/{id}"))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::NOT_FOUND);

		let body: Value = test::read_body_json(resp).await;
		assert_eq!(body["statusCode"], 404);
	}

	fixture.shutdown().await;
}

#[actix_web::test]
async fn test_rate_limit_is_applied_per_user() {
	let fixture = Fixture::new(0.0, 2);
	let app = init_app!(fixture);

	for _ in 0..2 {
		let resp = test::call_service(&app, post_payment("u1", 5.0, "USD").to_request()).await;
		assert_eq!(resp.status(), StatusCode::CREATED);
	}

	let resp = test::call_service(&app, post_payment("u1", 5.0, "USD").to_request()).await;
	assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
	assert_eq!(resp.headers().get(RETRY_AFTER).unwrap(), "1");
	let body: Value = test::read_body_json(resp).await;
	assert_eq!(body["statusCode"], 429);

	let resp = test::call_service(&app, post_payment("u2", 5.0, "USD").to_request()).await;
	assert_eq!(resp.status(), StatusCode::CREATED);

	assert_eq!(fixture.stats.execute().await.total_payments, 3);
	assert_eq!(fixture.limiter.active_keys(), 2);
	fixture.shutdown().await;
}

#[actix_web::test]
async fn test_malformed_body_is_rate_limited_and_answered_as_json() {
	let fixture = Fixture::new(0.0, 1);
	let app = init_app!(fixture);

	let malformed = || {
		test::TestRequest::post()
			.uri("/api/v1/payments")
			.insert_header((USER_ID_HEADER, "u1"))
			.insert_header(("content-type", "application/json"))
			.set_payload(r#"{"user_id": 5}"#)
			.to_request()
	};

	let resp = test::call_service(&app, malformed()).await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	let body: Value = test::read_body_json(resp).await;
	assert_eq!(body["statusCode"], 400);
	assert_eq!(body["error"], "Validation failed.");
	assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));

	for _ in 0..2 {
		let resp = test::call_service(&app, malformed()).await;
		assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
		let body: Value = test::read_body_json(resp).await;
		assert_eq!(body["statusCode"], 429);
	}

	assert_eq!(fixture.limiter.active_keys(), 1);
	assert_eq!(fixture.stats.execute().await.total_payments, 0);
	fixture.shutdown().await;
}

#[actix_web::test]
async fn test_stats_reflect_processed_payments() {
	let fixture = Fixture::new(100.0, 100);
	let app = init_app!(fixture);

	for amount in [10.0, 20.0, 30.0] {
		let resp = test::call_service(&app, post_payment("u1", amount, "USD").to_request()).await;
		assert_eq!(resp.status(), StatusCode::CREATED);
	}
	fixture.worker_pool.shutdown().await;

	let req = test::TestRequest::get()
		.uri("/api/v1/payments/metrics/stats")
		.to_request();
	let resp = test::call_service(&app, req).await;
	assert_eq!(resp.status(), StatusCode::OK);

	let body: StatsResponse = test::read_body_json(resp).await;
	assert_eq!(body.stats.total_payments, 3);
	assert_eq!(body.stats.completed_payments, 3);
	assert_eq!(body.stats.total_amount, 60.0);

	fixture.notifier.shutdown().await;
}

#[actix_web::test]
async fn test_health_is_not_rate_limited() {
	let fixture = Fixture::new(0.0, 1);
	let app = init_app!(fixture);

	let resp = test::call_service(&app, post_payment("u1", 5.0, "USD").to_request()).await;
	assert_eq!(resp.status(), StatusCode::CREATED);

	for _ in 0..3 {
		let req = test::TestRequest::get()
			.uri("/health")
			.insert_header((USER_ID_HEADER, "u1"))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);

		let body: HealthResponse = test::read_body_json(resp).await;
		assert_eq!(body.status, "healthy");
		assert_eq!(body.workers.worker_count, 2);
		assert_eq!(body.workers.queue_capacity, 16);
		assert_eq!(body.rate_limiter.active_keys, 1);
		assert_eq!(body.payments.total_payments, 1);
	}

	fixture.shutdown().await;
}

#[actix_web::test]
async fn test_create_payment_during_shutdown_is_unavailable() {
	let fixture = Fixture::new(100.0, 100);
	let app = init_app!(fixture);
	fixture.shutdown().await;

	let resp = test::call_service(&app, post_payment("u1", 5.0, "USD").to_request()).await;
	assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

	let req = test::TestRequest::get().uri("/health").to_request();
	let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
	assert_eq!(body.status, "shutting_down");
}
