use actix_web::HttpRequest;
use log::warn;

use crate::adapters::web::errors::ApiError;
use crate::infrastructure::rate_limiting::keyed_rate_limiter::KeyedRateLimiter;

pub const USER_ID_HEADER: &str = "X-User-ID";

/// Caller identity: the `X-User-ID` header, else the peer address.
pub fn caller_key(req: &HttpRequest) -> String {
	req.headers()
		.get(USER_ID_HEADER)
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.map(str::to_owned)
		.or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
		.unwrap_or_else(|| "unknown".to_string())
}

pub fn admit(req: &HttpRequest, limiter: &KeyedRateLimiter) -> Result<(), ApiError> {
	let key = caller_key(req);
	if limiter.allow(&key) {
		Ok(())
	} else {
		warn!("Rate limit exceeded for {key}");
		Err(ApiError::RateLimited { key })
	}
}
