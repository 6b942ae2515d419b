use std::sync::Arc;

use log::{info, warn};
use time::OffsetDateTime;

use crate::domain::errors::PaymentError;
use crate::domain::gateway::PaymentGateway;
use crate::domain::payment::Payment;
use crate::domain::repository::PaymentRepository;
use crate::infrastructure::workers::worker_pool::{Task, TaskError, WorkerPool};
use crate::use_cases::dto::{CreatePaymentCommand, CreatePaymentReceipt};
use crate::use_cases::process_payment::ProcessPaymentUseCase;

pub struct CreatePaymentUseCase<R: PaymentRepository, G: PaymentGateway> {
	payment_repo: R,
	worker_pool:  Arc<WorkerPool>,
	processor:    Arc<ProcessPaymentUseCase<R, G>>,
}

impl<R: PaymentRepository, G: PaymentGateway> CreatePaymentUseCase<R, G> {
	pub fn new(
		payment_repo: R,
		worker_pool: Arc<WorkerPool>,
		processor: Arc<ProcessPaymentUseCase<R, G>>,
	) -> Self {
		Self {
			payment_repo,
			worker_pool,
			processor,
		}
	}

	/// Stores a `Pending` payment and queues its processing without waiting
	/// for queue space. When the queue rejects the task the record is kept
	/// but never processed, and the rejection is returned.
	pub async fn execute(
		&self,
		command: CreatePaymentCommand,
	) -> Result<CreatePaymentReceipt, PaymentError> {
		let payment = Payment::create(command.into(), OffsetDateTime::now_utc())?;
		let payment_id = payment.id;
		let status = payment.status;

		info!(
			"Payment created: ID={payment_id}, Amount={:.2} {}",
			payment.amount, payment.currency
		);
		self.payment_repo.insert(payment).await?;

		let processor = Arc::clone(&self.processor);
		let task = Task::new(payment_id.to_string(), async move {
			processor
				.execute(payment_id)
				.await
				.map(|_| ())
				.map_err(|e| Box::new(e) as TaskError)
		});

		if let Err(e) = self.worker_pool.submit_async(task) {
			warn!("Failed to submit payment {payment_id} to worker pool: {e}");
			return Err(e.into());
		}

		Ok(CreatePaymentReceipt {
			payment_id,
			status,
			message: "Payment queued for processing".to_string(),
		})
	}
}
