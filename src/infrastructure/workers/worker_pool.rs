use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use derive_more::derive::{Display, Error};
use log::{error, info, warn};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex as AsyncMutex, mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::errors::PaymentError;

pub type TaskError = Box<dyn StdError + Send + Sync>;
type TaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>>;

/// One unit of work, executed at most once by whichever worker claims it.
pub struct Task {
	id:   String,
	work: TaskFuture,
}

impl Task {
	pub fn new<F>(id: impl Into<String>, work: F) -> Self
	where
		F: Future<Output = Result<(), TaskError>> + Send + 'static,
	{
		Self {
			id:   id.into(),
			work: Box::pin(work),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}
}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
	#[display("task queue is full")]
	QueueFull,
	#[display("worker pool is shutting down")]
	PoolClosed,
}

impl From<PoolError> for PaymentError {
	fn from(err: PoolError) -> Self {
		match err {
			PoolError::QueueFull => PaymentError::QueueFull,
			PoolError::PoolClosed => PaymentError::PoolClosed,
		}
	}
}

#[derive(Default)]
struct Gauges {
	queued: AtomicUsize,
	busy:   AtomicUsize,
	live:   AtomicUsize,
}

/// Fixed number of workers fed by a bounded queue.
///
/// Shutdown closes the queue's input side; workers keep draining whatever was
/// already accepted and exit once the queue is empty.
pub struct WorkerPool {
	worker_count:   usize,
	queue_capacity: usize,
	sender:         Mutex<Option<mpsc::Sender<Task>>>,
	receiver:       Mutex<Option<mpsc::Receiver<Task>>>,
	closing:        watch::Sender<bool>,
	workers:        Mutex<Vec<JoinHandle<()>>>,
	gauges:         Arc<Gauges>,
}

impl WorkerPool {
	pub fn new(worker_count: usize, queue_capacity: usize) -> Self {
		let worker_count = worker_count.max(1);
		let queue_capacity = queue_capacity.max(1);
		let (sender, receiver) = mpsc::channel(queue_capacity);
		let (closing, _) = watch::channel(false);

		Self {
			worker_count,
			queue_capacity,
			sender: Mutex::new(Some(sender)),
			receiver: Mutex::new(Some(receiver)),
			closing,
			workers: Mutex::new(Vec::with_capacity(worker_count)),
			gauges: Arc::new(Gauges::default()),
		}
	}

	/// Spawns the workers on the current tokio runtime.
	pub fn start(&self) {
		let Some(receiver) = lock(&self.receiver).take() else {
			warn!("Worker pool already started or shut down");
			return;
		};

		info!("Starting worker pool with {} workers", self.worker_count);

		let queue = Arc::new(AsyncMutex::new(receiver));
		let mut workers = lock(&self.workers);
		for worker_id in 0..self.worker_count {
			self.gauges.live.fetch_add(1, Ordering::SeqCst);
			workers.push(tokio::spawn(run_worker(
				worker_id,
				Arc::clone(&queue),
				Arc::clone(&self.gauges),
			)));
		}

		info!("All {} workers are now running", self.worker_count);
	}

	/// Waits for queue space. Resolves to `PoolClosed` if shutdown starts
	/// first.
	pub async fn submit(&self, task: Task) -> Result<(), PoolError> {
		let sender = lock(&self.sender).clone().ok_or(PoolError::PoolClosed)?;
		let mut closing = self.closing.subscribe();

		tokio::select! {
			biased;

			_ = closing.wait_for(|closed| *closed) => Err(PoolError::PoolClosed),
			permit = sender.reserve() => match permit {
				Ok(permit) => {
					self.gauges.queued.fetch_add(1, Ordering::SeqCst);
					info!("Task {} submitted to queue", task.id);
					permit.send(task);
					Ok(())
				}
				Err(_) => Err(PoolError::PoolClosed),
			},
		}
	}

	/// Enqueues without waiting.
	pub fn submit_async(&self, task: Task) -> Result<(), PoolError> {
		let sender = lock(&self.sender);
		let Some(sender) = sender.as_ref() else {
			return Err(PoolError::PoolClosed);
		};

		match sender.try_reserve() {
			Ok(permit) => {
				self.gauges.queued.fetch_add(1, Ordering::SeqCst);
				info!("Task {} submitted to queue (async)", task.id);
				permit.send(task);
				Ok(())
			}
			Err(TrySendError::Full(())) => Err(PoolError::QueueFull),
			Err(TrySendError::Closed(())) => Err(PoolError::PoolClosed),
		}
	}

	/// Stops accepting work, lets the workers drain the queue and waits for
	/// them to exit. Later calls return immediately.
	pub async fn shutdown(&self) {
		info!("Initiating worker pool shutdown...");

		self.closing.send_replace(true);
		drop(lock(&self.sender).take());
		// Never started: nothing will drain what was queued.
		if let Some(receiver) = lock(&self.receiver).take() {
			drop(receiver);
			self.gauges.queued.store(0, Ordering::SeqCst);
		}

		let workers = std::mem::take(&mut *lock(&self.workers));
		for worker in workers {
			if let Err(e) = worker.await {
				error!("Worker terminated abnormally: {e}");
			}
		}

		info!("Worker pool shutdown complete");
	}

	pub fn is_closed(&self) -> bool {
		*self.closing.borrow()
	}

	pub fn queue_length(&self) -> usize {
		self.gauges.queued.load(Ordering::SeqCst)
	}

	pub fn queue_capacity(&self) -> usize {
		self.queue_capacity
	}

	pub fn worker_count(&self) -> usize {
		self.worker_count
	}

	/// Workers currently executing a task.
	pub fn busy_workers(&self) -> usize {
		self.gauges.busy.load(Ordering::SeqCst)
	}

	/// Worker loops that have not exited yet.
	pub fn live_workers(&self) -> usize {
		self.gauges.live.load(Ordering::SeqCst)
	}
}

async fn run_worker(
	worker_id: usize,
	queue: Arc<AsyncMutex<mpsc::Receiver<Task>>>,
	gauges: Arc<Gauges>,
) {
	info!("Worker {worker_id} started");

	loop {
		let next = queue.lock().await.recv().await;
		let Some(Task { id, work }) = next else {
			info!("Worker {worker_id}: task queue closed, shutting down");
			break;
		};

		gauges.queued.fetch_sub(1, Ordering::SeqCst);
		gauges.busy.fetch_add(1, Ordering::SeqCst);
		let started = Instant::now();

		// Run on its own task so a panic is contained to this unit of work.
		match tokio::spawn(work).await {
			Ok(Ok(())) => info!(
				"Worker {worker_id}: task {id} completed in {:?}",
				started.elapsed()
			),
			Ok(Err(e)) => error!(
				"Worker {worker_id}: task {id} failed after {:?}: {e}",
				started.elapsed()
			),
			Err(e) => error!("Worker {worker_id}: task {id} aborted: {e}"),
		}

		gauges.busy.fetch_sub(1, Ordering::SeqCst);
	}

	gauges.live.fetch_sub(1, Ordering::SeqCst);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
