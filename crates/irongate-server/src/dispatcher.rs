//! EventDispatcher — background task that flushes the event queue to
//! the durable batch sink. Runs a claim-or-sleep loop with
//! outcome-specific bookkeeping instead of a single success/failure
//! branch.

use std::sync::Arc;
use std::time::Duration;

use irongate_core::queue::{EventQueue, FlushOutcome};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::Notify;
use uuid::Uuid;

const QUEUE_POST_TIMEOUT: Duration = Duration::from_secs(10);

/// Background dispatcher that periodically flushes queued events to
/// `sink_url` as `{batchId, events}` POSTs matching the `/events/batch`
/// wire shape, honoring 2xx/4xx/5xx semantics.
pub struct EventDispatcher {
    queue: Arc<EventQueue>,
    client: Client,
    sink_url: String,
    reconnect: Arc<Notify>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchBody<'a> {
    batch_id: String,
    events: &'a [irongate_types::EventRecord],
}

impl EventDispatcher {
    pub fn new(queue: Arc<EventQueue>, client: Client, sink_url: String, reconnect: Arc<Notify>) -> Self {
        Self { queue, client, sink_url, reconnect }
    }

    /// Run the dispatcher loop. Never returns under normal operation;
    /// spawn via `tokio::spawn`.
    pub async fn run(&self) {
        tracing::info!(sink = %self.sink_url, "event dispatcher started");
        loop {
            let batch = self.queue.peek_batch().await;
            if batch.is_empty() {
                tokio::select! {
                    _ = tokio::time::sleep(EventQueue::flush_idle_duration()) => {}
                    _ = self.reconnect.notified() => {}
                }
                continue;
            }

            match self.flush_once(&batch).await {
                FlushOutcome::Acknowledged => {
                    if let Err(e) = self.queue.acknowledge(batch.len()).await {
                        tracing::error!(%e, "failed to acknowledge flushed batch");
                    } else {
                        tracing::debug!(count = batch.len(), "event batch acknowledged");
                    }
                }
                FlushOutcome::Rejected => {
                    if let Err(e) = self.queue.reject(batch.len()).await {
                        tracing::error!(%e, "failed to drop rejected batch");
                    }
                }
                FlushOutcome::RetryableFailure => {
                    tracing::warn!(count = batch.len(), "event batch flush failed, will retry");
                    self.queue.mark_retry(batch.len()).await;
                    if let Some(backoff) = EventQueue::backoff_for(1) {
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }
    }

    async fn flush_once(&self, batch: &[irongate_types::EventRecord]) -> FlushOutcome {
        let body = BatchBody { batch_id: Uuid::new_v4().to_string(), events: batch };
        match self.client.post(&self.sink_url).json(&body).timeout(QUEUE_POST_TIMEOUT).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    FlushOutcome::Acknowledged
                } else if status.is_client_error() {
                    FlushOutcome::Rejected
                } else {
                    FlushOutcome::RetryableFailure
                }
            }
            Err(error) => {
                tracing::warn!(%error, sink = %self.sink_url, "event batch POST failed");
                FlushOutcome::RetryableFailure
            }
        }
    }
}

/// Convenience wrapper used by `main` to spawn both the dispatcher and
/// its backing health probe against the same reconnect signal.
pub fn spawn_dispatcher(dispatcher: Arc<EventDispatcher>) {
    tokio::spawn(async move {
        dispatcher.run().await;
    });
}

pub fn health_probe_interval() -> Duration {
    EventQueue::health_probe_interval()
}
