#![allow(dead_code)]

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use payment_engine::domain::gateway::{ChargeOutcome, PaymentGateway};
use payment_engine::domain::notification::{NotificationEvent, NotificationSink};
use payment_engine::domain::payment::Payment;
use payment_engine::domain::repository::PaymentRepository;
use payment_engine::domain::stats::PaymentCounters;
use payment_engine::infrastructure::notifications::notification_dispatcher::NotificationDispatcher;
use payment_engine::infrastructure::persistence::in_memory_payment_repository::InMemoryPaymentRepository;
use payment_engine::infrastructure::workers::worker_pool::WorkerPool;
use payment_engine::use_cases::create_payment::CreatePaymentUseCase;
use payment_engine::use_cases::dto::CreatePaymentCommand;
use payment_engine::use_cases::get_payment::GetPaymentUseCase;
use payment_engine::use_cases::get_stats::GetStatsUseCase;
use payment_engine::use_cases::process_payment::ProcessPaymentUseCase;
use tokio::sync::{Notify, Semaphore};
use tokio::time::{Instant, sleep, timeout};

/// Approves every payment except those whose amount is listed.
pub struct DeclineAmountsGateway {
	declined: Vec<f64>,
}

impl DeclineAmountsGateway {
	pub fn approve_all() -> Self {
		Self { declined: vec![] }
	}

	pub fn declining(amounts: &[f64]) -> Self {
		Self {
			declined: amounts.to_vec(),
		}
	}
}

#[async_trait]
impl PaymentGateway for DeclineAmountsGateway {
	async fn charge(&self, payment: &Payment) -> ChargeOutcome {
		if self.declined.contains(&payment.amount) {
			ChargeOutcome::Declined
		} else {
			ChargeOutcome::Approved
		}
	}
}

/// Holds every charge until the test hands out permits.
#[derive(Clone)]
pub struct GatedGateway {
	pub gate: Arc<Semaphore>,
}

impl GatedGateway {
	pub fn closed() -> Self {
		Self {
			gate: Arc::new(Semaphore::new(0)),
		}
	}

	pub fn release(&self, charges: usize) {
		self.gate.add_permits(charges);
	}
}

#[async_trait]
impl PaymentGateway for GatedGateway {
	async fn charge(&self, _payment: &Payment) -> ChargeOutcome {
		match self.gate.acquire().await {
			Ok(permit) => {
				permit.forget();
				ChargeOutcome::Approved
			}
			Err(_) => ChargeOutcome::Declined,
		}
	}
}

#[derive(Default)]
pub struct RecordingSink {
	events:    Mutex<Vec<NotificationEvent>>,
	delivered: Notify,
}

impl RecordingSink {
	pub fn events(&self) -> Vec<NotificationEvent> {
		self.events.lock().unwrap().clone()
	}

	pub async fn wait_for(&self, count: usize) -> Vec<NotificationEvent> {
		timeout(Duration::from_secs(5), async {
			loop {
				let notified = self.delivered.notified();
				let events = self.events();
				if events.len() >= count {
					return events;
				}
				notified.await;
			}
		})
		.await
		.expect("notifications were not delivered in time")
	}
}

#[async_trait]
impl NotificationSink for RecordingSink {
	async fn deliver(
		&self,
		event: NotificationEvent,
	) -> Result<(), Box<dyn Error + Send + Sync>> {
		self.events.lock().unwrap().push(event);
		self.delivered.notify_waiters();
		Ok(())
	}
}

#[derive(Default)]
pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
	async fn deliver(
		&self,
		event: NotificationEvent,
	) -> Result<(), Box<dyn Error + Send + Sync>> {
		Err(format!("webhook endpoint rejected {}", event.payment_id).into())
	}
}

#[derive(Default)]
pub struct PanickingSink;

#[async_trait]
impl NotificationSink for PanickingSink {
	async fn deliver(
		&self,
		event: NotificationEvent,
	) -> Result<(), Box<dyn Error + Send + Sync>> {
		panic!("webhook client crashed on {}", event.payment_id)
	}
}

/// Never finishes a delivery until permits are added.
pub struct StuckSink {
	pub gate: Semaphore,
}

impl Default for StuckSink {
	fn default() -> Self {
		Self {
			gate: Semaphore::new(0),
		}
	}
}

#[async_trait]
impl NotificationSink for StuckSink {
	async fn deliver(
		&self,
		_event: NotificationEvent,
	) -> Result<(), Box<dyn Error + Send + Sync>> {
		let _permit = self.gate.acquire().await?;
		Ok(())
	}
}

pub struct TestEngine<G: PaymentGateway> {
	pub payment_repo: InMemoryPaymentRepository,
	pub worker_pool:  Arc<WorkerPool>,
	pub notifier:     Arc<NotificationDispatcher>,
	pub processor:    Arc<ProcessPaymentUseCase<InMemoryPaymentRepository, G>>,
	pub create:       CreatePaymentUseCase<InMemoryPaymentRepository, G>,
	pub get:          GetPaymentUseCase<InMemoryPaymentRepository>,
	pub stats:        GetStatsUseCase<InMemoryPaymentRepository>,
}

impl<G: PaymentGateway> TestEngine<G> {
	pub fn start<S: NotificationSink>(
		gateway: G,
		sink: Arc<S>,
		workers: usize,
		queue_capacity: usize,
	) -> Self {
		let worker_pool = Arc::new(WorkerPool::new(workers, queue_capacity));
		worker_pool.start();
		let notifier = Arc::new(NotificationDispatcher::start(16, sink));
		let payment_repo = InMemoryPaymentRepository::new();

		let processor = Arc::new(ProcessPaymentUseCase::new(
			payment_repo.clone(),
			gateway,
			Arc::clone(&notifier),
		));

		Self {
			create: CreatePaymentUseCase::new(
				payment_repo.clone(),
				Arc::clone(&worker_pool),
				Arc::clone(&processor),
			),
			get: GetPaymentUseCase::new(payment_repo.clone()),
			stats: GetStatsUseCase::new(
				payment_repo.clone(),
				Arc::clone(&worker_pool),
				Arc::clone(&notifier),
			),
			payment_repo,
			worker_pool,
			notifier,
			processor,
		}
	}

	pub async fn counters(&self) -> PaymentCounters {
		self.payment_repo.counters().await
	}

	/// Polls the counters until `done` holds or five seconds pass.
	pub async fn wait_until<F>(&self, done: F) -> PaymentCounters
	where
		F: Fn(&PaymentCounters) -> bool,
	{
		let deadline = Instant::now() + Duration::from_secs(5);
		loop {
			let counters = self.counters().await;
			if done(&counters) {
				return counters;
			}
			assert!(Instant::now() < deadline, "timed out waiting: {counters:?}");
			sleep(Duration::from_millis(5)).await;
		}
	}

	pub async fn shutdown(&self) {
		self.worker_pool.shutdown().await;
		self.notifier.shutdown().await;
	}
}

pub fn command(user_id: &str, amount: f64, currency: &str) -> CreatePaymentCommand {
	CreatePaymentCommand {
		user_id:     user_id.to_string(),
		amount,
		currency:    currency.to_string(),
		description: format!("{amount} {currency} for {user_id}"),
	}
}
