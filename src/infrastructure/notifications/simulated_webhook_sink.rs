use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::time::sleep;

use crate::domain::notification::{NotificationEvent, NotificationSink};

/// Stands in for an HTTP webhook call: waits, then reports success.
#[derive(Debug, Clone)]
pub struct SimulatedWebhookSink {
	latency: Duration,
}

impl SimulatedWebhookSink {
	pub fn new(latency: Duration) -> Self {
		Self { latency }
	}
}

#[async_trait]
impl NotificationSink for SimulatedWebhookSink {
	async fn deliver(
		&self,
		event: NotificationEvent,
	) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		sleep(self.latency).await;
		debug!(
			"Webhook payload delivered: {}",
			serde_json::to_string(&event)?
		);
		Ok(())
	}
}
