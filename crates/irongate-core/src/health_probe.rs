//! Health probe for the event queue's durable-transport endpoint:
//! periodic polling that triggers a flush once connectivity is restored.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Polls `health_url` on `interval`; calls `on_reconnect` once whenever
/// a down probe starts succeeding again. Runs until cancelled — intended
/// to be spawned as a background task by the server binary.
pub async fn run_health_probe<F, Fut>(
    client: Client,
    health_url: String,
    interval: Duration,
    mut on_reconnect: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut was_down = false;
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let healthy = probe_once(&client, &health_url).await;
        if healthy && was_down {
            tracing::info!(url = %health_url, "health probe reconnected");
            on_reconnect().await;
        }
        was_down = !healthy;
    }
}

async fn probe_once(client: &Client, url: &str) -> bool {
    match client.get(url).timeout(PROBE_TIMEOUT).send().await {
        Ok(response) => response.status().is_success(),
        Err(error) => {
            tracing::warn!(url, %error, "health probe request failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_reports_failure_for_unreachable_host() {
        let client = Client::new();
        let healthy = probe_once(&client, "http://127.0.0.1:1/health").await;
        assert!(!healthy);
    }
}
