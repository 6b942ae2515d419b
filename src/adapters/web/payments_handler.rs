use actix_web::{HttpRequest, HttpResponse, get, post, web};
use log::{info, warn};

use crate::adapters::web::errors::ApiError;
use crate::adapters::web::rate_limit::admit;
use crate::adapters::web::routes::{
	AppCreatePaymentUseCase, AppGetPaymentUseCase, AppGetStatsUseCase,
};
use crate::adapters::web::schema::{PaymentRequest, PaymentResponse, StatsResponse};
use crate::infrastructure::rate_limiting::keyed_rate_limiter::KeyedRateLimiter;
use crate::use_cases::dto::CreatePaymentCommand;

/// The body is read raw so admission happens before it is parsed.
#[post("/payments")]
pub async fn create_payment(
	req: HttpRequest,
	body: web::Bytes,
	rate_limiter: web::Data<KeyedRateLimiter>,
	create_payment_use_case: web::Data<AppCreatePaymentUseCase>,
) -> Result<HttpResponse, ApiError> {
	admit(&req, &rate_limiter)?;

	let payload: PaymentRequest = serde_json::from_slice(&body).map_err(|e| {
		warn!("Rejecting malformed payment request: {e}");
		ApiError::ValidationError {
			message: format!("Invalid request body: {e}"),
		}
	})?;
	let command = CreatePaymentCommand {
		user_id:     payload.user_id,
		amount:      payload.amount,
		currency:    payload.currency,
		description: payload.description,
	};

	match create_payment_use_case.execute(command).await {
		Ok(receipt) => {
			info!("Payment created successfully: {}", receipt.payment_id);
			Ok(HttpResponse::Created().json(receipt))
		}
		Err(e) => {
			warn!("Failed to create payment: {e}");
			Err(e.into())
		}
	}
}

#[get("/payments/{payment_id}")]
pub async fn get_payment(
	req: HttpRequest,
	payment_id: web::Path<String>,
	rate_limiter: web::Data<KeyedRateLimiter>,
	get_payment_use_case: web::Data<AppGetPaymentUseCase>,
) -> Result<HttpResponse, ApiError> {
	admit(&req, &rate_limiter)?;

	match get_payment_use_case.execute(&payment_id).await {
		Ok(payment) => Ok(HttpResponse::Ok().json(PaymentResponse { payment })),
		Err(e) => {
			info!("Payment lookup failed: {e}");
			Err(e.into())
		}
	}
}

#[get("/payments/metrics/stats")]
pub async fn payment_stats(
	req: HttpRequest,
	rate_limiter: web::Data<KeyedRateLimiter>,
	get_stats_use_case: web::Data<AppGetStatsUseCase>,
) -> Result<HttpResponse, ApiError> {
	admit(&req, &rate_limiter)?;

	let stats = get_stats_use_case.execute().await;
	Ok(HttpResponse::Ok().json(StatsResponse { stats }))
}
