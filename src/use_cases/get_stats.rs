use std::sync::Arc;

use crate::domain::repository::PaymentRepository;
use crate::domain::stats::StatsSnapshot;
use crate::infrastructure::notifications::notification_dispatcher::NotificationDispatcher;
use crate::infrastructure::workers::worker_pool::WorkerPool;

pub struct GetStatsUseCase<R: PaymentRepository> {
	payment_repo: R,
	worker_pool:  Arc<WorkerPool>,
	notifier:     Arc<NotificationDispatcher>,
}

impl<R: PaymentRepository> GetStatsUseCase<R> {
	pub fn new(
		payment_repo: R,
		worker_pool: Arc<WorkerPool>,
		notifier: Arc<NotificationDispatcher>,
	) -> Self {
		Self {
			payment_repo,
			worker_pool,
			notifier,
		}
	}

	pub async fn execute(&self) -> StatsSnapshot {
		let active_tasks =
			self.worker_pool.live_workers() + self.notifier.active_tasks();

		self.payment_repo.counters().await.snapshot(active_tasks)
	}
}
