//! Event queue: in-memory FIFO with a durable mirror,
//! capped size, batch flush, and retry backoff.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use irongate_types::EventRecord;
use rand::Rng;
use tokio::sync::Mutex;

use crate::error::Result;

const MAX_QUEUE_SIZE: usize = 1000;
const BATCH_SIZE: usize = 100;
const FLUSH_IDLE: Duration = Duration::from_secs(2);
const MAX_RETRY_ATTEMPTS: u32 = 5;
const HEALTH_PROBE_INTERVAL: Duration = Duration::from_secs(30);

/// Durable side-channel mirror so the queue survives process restarts:
/// every mutation is serialized to it, and the queue reloads from it on
/// startup. `irongate-postgres` supplies a real implementation; the
/// default is a no-op.
#[async_trait]
pub trait EventMirror: Send + Sync {
    async fn persist(&self, events: &[EventRecord]) -> Result<()>;
    async fn reload(&self) -> Result<Vec<EventRecord>>;
}

pub struct NoopEventMirror;

#[async_trait]
impl EventMirror for NoopEventMirror {
    async fn persist(&self, _events: &[EventRecord]) -> Result<()> {
        Ok(())
    }

    async fn reload(&self) -> Result<Vec<EventRecord>> {
        Ok(Vec::new())
    }
}

/// Outcome of a single flush attempt against the batch transport, to be
/// supplied by the caller driving the flush loop (typically the server
/// crate's HTTP client against `events/batch`).
pub enum FlushOutcome {
    Acknowledged,
    RetryableFailure,
    Rejected,
}

#[derive(Debug, Clone)]
struct QueuedEvent {
    event: EventRecord,
    attempts: u32,
}

pub struct EventQueue {
    events: Mutex<VecDeque<QueuedEvent>>,
    mirror: Arc<dyn EventMirror>,
}

impl EventQueue {
    pub fn new(mirror: Arc<dyn EventMirror>) -> Self {
        Self { events: Mutex::new(VecDeque::new()), mirror }
    }

    /// Rehydrate from the durable mirror at startup.
    pub async fn reload(&self) -> Result<()> {
        let restored = self.mirror.reload().await?;
        let mut events = self.events.lock().await;
        for event in restored {
            push_capped(&mut events, event);
        }
        Ok(())
    }

    /// Append one event, dropping the oldest if the cap is exceeded.
    /// Queue size never exceeds `MAX_QUEUE_SIZE` after any operation.
    pub async fn enqueue(&self, event: EventRecord) -> Result<()> {
        let mut events = self.events.lock().await;
        let dropped = push_capped(&mut events, event);
        if dropped {
            tracing::warn!(queue_size = MAX_QUEUE_SIZE, "event queue at capacity, dropped oldest event");
        }
        let snapshot: Vec<EventRecord> = events.iter().map(|q| q.event.clone()).collect();
        drop(events);
        self.mirror.persist(&snapshot).await
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Pull up to `BATCH_SIZE` events without removing them; the caller
    /// removes on acknowledgement via `acknowledge`.
    pub async fn peek_batch(&self) -> Vec<EventRecord> {
        let events = self.events.lock().await;
        events.iter().take(BATCH_SIZE).map(|q| q.event.clone()).collect()
    }

    /// Remove the first `count` events — call after a flush is
    /// acknowledged. No successfully-acknowledged batch ever reappears.
    pub async fn acknowledge(&self, count: usize) -> Result<()> {
        let mut events = self.events.lock().await;
        for _ in 0..count.min(events.len()) {
            events.pop_front();
        }
        let snapshot: Vec<EventRecord> = events.iter().map(|q| q.event.clone()).collect();
        drop(events);
        self.mirror.persist(&snapshot).await
    }

    /// Drop the first `count` events outright on a 4xx response, logging
    /// instead of retrying.
    pub async fn reject(&self, count: usize) -> Result<()> {
        tracing::warn!(count, "event batch rejected by upstream, dropping");
        self.acknowledge(count).await
    }

    /// Mark the first `count` events as having failed a delivery
    /// attempt, incrementing their retry counters in place.
    pub async fn mark_retry(&self, count: usize) {
        let mut events = self.events.lock().await;
        for queued in events.iter_mut().take(count) {
            queued.attempts += 1;
        }
    }

    /// Backoff duration before the next retry for an event at `attempts`:
    /// `2^attempt * 1s + jitter`, capped at `MAX_RETRY_ATTEMPTS`.
    pub fn backoff_for(attempts: u32) -> Option<Duration> {
        if attempts >= MAX_RETRY_ATTEMPTS {
            return None;
        }
        let base = Duration::from_secs(2u64.saturating_pow(attempts));
        let jitter_ms = rand::thread_rng().gen_range(0..250);
        Some(base + Duration::from_millis(jitter_ms))
    }

    pub fn flush_idle_duration() -> Duration {
        FLUSH_IDLE
    }

    pub fn health_probe_interval() -> Duration {
        HEALTH_PROBE_INTERVAL
    }
}

fn push_capped(events: &mut VecDeque<QueuedEvent>, event: EventRecord) -> bool {
    events.push_back(QueuedEvent { event, attempts: 0 });
    if events.len() > MAX_QUEUE_SIZE {
        events.pop_front();
        true
    } else {
        false
    }
}
