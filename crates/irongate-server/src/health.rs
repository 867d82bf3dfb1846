//! Wires `irongate_core::health_probe::run_health_probe` into a
//! background task, reconnecting the event-queue
//! dispatcher's flush loop once the durable sink comes back up.

use std::sync::Arc;
use std::time::Duration;

use irongate_core::health_probe::run_health_probe;
use reqwest::Client;
use tokio::sync::Notify;

/// Spawns the health-probe loop. `reconnect` is notified once whenever
/// the probe transitions from down to up, so the flush dispatcher can
/// wake immediately instead of waiting out its idle interval.
pub fn spawn_health_probe(client: Client, health_url: String, interval: Duration, reconnect: Arc<Notify>) {
    tokio::spawn(async move {
        run_health_probe(client, health_url, interval, || {
            let reconnect = Arc::clone(&reconnect);
            async move {
                reconnect.notify_one();
            }
        })
        .await;
    });
}
