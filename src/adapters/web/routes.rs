use actix_web::web;

use crate::adapters::web::health_handler::health;
use crate::adapters::web::payments_handler::{create_payment, get_payment, payment_stats};
use crate::infrastructure::gateway::simulated_payment_gateway::SimulatedPaymentGateway;
use crate::infrastructure::persistence::in_memory_payment_repository::InMemoryPaymentRepository;
use crate::use_cases::create_payment::CreatePaymentUseCase;
use crate::use_cases::get_payment::GetPaymentUseCase;
use crate::use_cases::get_stats::GetStatsUseCase;

pub type AppCreatePaymentUseCase =
	CreatePaymentUseCase<InMemoryPaymentRepository, SimulatedPaymentGateway>;
pub type AppGetPaymentUseCase = GetPaymentUseCase<InMemoryPaymentRepository>;
pub type AppGetStatsUseCase = GetStatsUseCase<InMemoryPaymentRepository>;

/// `/health` plus the rate-limited `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(health).service(
		web::scope("/api/v1")
			.service(payment_stats)
			.service(create_payment)
			.service(get_payment),
	);
}
