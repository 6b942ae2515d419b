use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{error, info, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use crate::domain::notification::{NotificationEvent, NotificationSink};

/// Buffered, fire-and-forget delivery of payment notifications.
///
/// Nothing here can fail a payment: a full buffer drops the event and a failed
/// delivery is only logged.
pub struct NotificationDispatcher {
	sender:        Mutex<Option<mpsc::Sender<NotificationEvent>>>,
	dispatch_loop: Mutex<Option<JoinHandle<()>>>,
	loop_running:  Arc<AtomicBool>,
	in_flight:     Arc<AtomicUsize>,
	dropped:       AtomicU64,
}

impl NotificationDispatcher {
	/// Spawns the dispatch loop on the current tokio runtime.
	pub fn start<S: NotificationSink>(capacity: usize, sink: Arc<S>) -> Self {
		let (sender, receiver) = mpsc::channel(capacity.max(1));
		let loop_running = Arc::new(AtomicBool::new(true));
		let in_flight = Arc::new(AtomicUsize::new(0));

		let dispatch_loop = tokio::spawn(dispatch(
			receiver,
			sink,
			Arc::clone(&loop_running),
			Arc::clone(&in_flight),
		));

		Self {
			sender: Mutex::new(Some(sender)),
			dispatch_loop: Mutex::new(Some(dispatch_loop)),
			loop_running,
			in_flight,
			dropped: AtomicU64::new(0),
		}
	}

	pub fn enqueue(&self, event: NotificationEvent) {
		let sender = lock(&self.sender);
		let Some(sender) = sender.as_ref() else {
			self.record_drop(&event, "dispatcher is shut down");
			return;
		};

		let payment_id = event.payment_id;
		match sender.try_send(event) {
			Ok(()) => info!("Notification queued for payment: {payment_id}"),
			Err(TrySendError::Full(event)) => {
				self.record_drop(&event, "notification buffer full")
			}
			Err(TrySendError::Closed(event)) => {
				self.record_drop(&event, "dispatcher is shut down")
			}
		}
	}

	/// Closes the buffer and waits for the loop to hand off what is left.
	/// Deliveries already spawned are not awaited.
	pub async fn shutdown(&self) {
		info!("Shutting down notification dispatcher...");
		drop(lock(&self.sender).take());

		let dispatch_loop = lock(&self.dispatch_loop).take();
		if let Some(dispatch_loop) = dispatch_loop &&
			let Err(e) = dispatch_loop.await
		{
			error!("Notification dispatch loop terminated abnormally: {e}");
		}

		info!("Notification dispatcher shut down");
	}

	/// Dispatch loop (while running) plus deliveries still in progress.
	pub fn active_tasks(&self) -> usize {
		usize::from(self.loop_running.load(Ordering::SeqCst)) +
			self.in_flight_deliveries()
	}

	pub fn in_flight_deliveries(&self) -> usize {
		self.in_flight.load(Ordering::SeqCst)
	}

	pub fn dropped_events(&self) -> u64 {
		self.dropped.load(Ordering::SeqCst)
	}

	fn record_drop(&self, event: &NotificationEvent, reason: &str) {
		self.dropped.fetch_add(1, Ordering::SeqCst);
		warn!(
			"Dropping notification for payment {} ({reason})",
			event.payment_id
		);
	}
}

async fn dispatch<S: NotificationSink>(
	mut receiver: mpsc::Receiver<NotificationEvent>,
	sink: Arc<S>,
	loop_running: Arc<AtomicBool>,
	in_flight: Arc<AtomicUsize>,
) {
	info!("Notification dispatcher started");

	while let Some(event) = receiver.recv().await {
		let sink = Arc::clone(&sink);
		let delivery = InFlight::enter(&in_flight);

		// Detached: the loop never waits on a delivery.
		tokio::spawn(async move {
			let _delivery = delivery;
			let payment_id = event.payment_id;
			let status = event.status;
			info!("Sending notification for payment {payment_id} (status: {status})");

			match sink.deliver(event).await {
				Ok(()) => info!("Notification sent for payment: {payment_id}"),
				Err(e) => {
					warn!("Notification delivery failed for payment {payment_id}: {e}")
				}
			}
		});
	}

	loop_running.store(false, Ordering::SeqCst);
	info!("Notification dispatcher stopped");
}

/// Counts one delivery for as long as it lives, including through a panic
/// in the sink.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
	fn enter(counter: &Arc<AtomicUsize>) -> Self {
		counter.fetch_add(1, Ordering::SeqCst);
		Self(Arc::clone(counter))
	}
}

impl Drop for InFlight {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
