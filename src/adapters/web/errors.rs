use actix_web::http::StatusCode;
use actix_web::http::header::{ContentType, RETRY_AFTER};
use actix_web::{HttpResponse, error};
use derive_more::derive::{Display, Error};
use serde::Serialize;

use crate::domain::errors::PaymentError;

#[derive(Serialize)]
struct ErrorResponse {
	#[serde(rename = "statusCode")]
	status_code: u16,
	error:       String,
	message:     String,
}

#[derive(Debug, Display, Error, PartialEq)]
pub enum ApiError {
	#[display("Validation failed.")]
	ValidationError { message: String },
	#[display("Rate limit exceeded.")]
	RateLimited { key: String },
	#[display("Payment queue is full.")]
	QueueFull,
	#[display("Service is shutting down.")]
	ShuttingDown,
	#[display("Payment not found.")]
	NotFound,
	#[display("Internal server error.")]
	InternalServerError,
}

impl ApiError {
	pub fn name(&self) -> String {
		match self {
			ApiError::ValidationError { message } => message.clone(),
			ApiError::RateLimited { key } => {
				format!("Too many requests for {key}. Please try again later")
			}
			ApiError::QueueFull => {
				"Too many payments in flight. Please try again later".to_string()
			}
			ApiError::ShuttingDown => "Service Unavailable".to_string(),
			ApiError::NotFound => "Not Found".to_string(),
			ApiError::InternalServerError => "Internal Server Error".to_string(),
		}
	}
}

impl error::ResponseError for ApiError {
	fn error_response(&self) -> HttpResponse {
		let mut response = HttpResponse::build(self.status_code());
		if matches!(self, ApiError::RateLimited { .. } | ApiError::QueueFull) {
			response.insert_header((RETRY_AFTER, "1"));
		}

		response.content_type(ContentType::json()).json(ErrorResponse {
			status_code: self.status_code().as_u16(),
			error:       self.to_string(),
			message:     self.name(),
		})
	}

	fn status_code(&self) -> StatusCode {
		match self {
			ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
			ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
			ApiError::QueueFull => StatusCode::SERVICE_UNAVAILABLE,
			ApiError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
			ApiError::NotFound => StatusCode::NOT_FOUND,
			ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<PaymentError> for ApiError {
	fn from(err: PaymentError) -> Self {
		match err {
			PaymentError::Validation { message } => {
				ApiError::ValidationError { message }
			}
			PaymentError::QueueFull => ApiError::QueueFull,
			PaymentError::PoolClosed => ApiError::ShuttingDown,
			PaymentError::NotFound { .. } => ApiError::NotFound,
			PaymentError::InvalidTransition { .. } => ApiError::InternalServerError,
		}
	}
}
