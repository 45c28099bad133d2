//! Optional keep-alive pinger.
//!
//! Some hosts put an idle service to sleep. When a keep-alive URL is
//! configured, a background task requests it at a fixed interval. It shares
//! only the HTTP client with the lookup pipeline.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Spawns the pinger. It stops when `cancel` fires.
///
/// Failures are logged and otherwise ignored; the next tick tries again.
pub fn spawn_keepalive(
    client: Arc<reqwest::Client>,
    url: String,
    period: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    log::info!("Keep-alive enabled: {} every {}s", url, period.as_secs());
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The service has just started, so skip the immediate tick
        interval.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => ping(&client, &url).await,
            }
        }
        log::debug!("Keep-alive stopped");
    })
}

async fn ping(client: &reqwest::Client, url: &str) {
    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => {
            log::debug!("Keep-alive ping ok ({})", response.status());
        }
        Ok(response) => log::warn!("Keep-alive ping to {} returned {}", url, response.status()),
        Err(e) => log::warn!("Keep-alive ping to {} failed: {}", url, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_pings_until_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let handle = spawn_keepalive(
            Arc::new(reqwest::Client::new()),
            format!("{}/ping", server.uri()),
            Duration::from_millis(50),
            cancel.clone(),
        );

        tokio::time::sleep(Duration::from_millis(180)).await;
        cancel.cancel();
        handle.await.expect("keep-alive task panicked");

        let pings = server.received_requests().await.unwrap_or_default().len();
        assert!(pings >= 2, "expected at least two pings, got {}", pings);
        tokio::time::sleep(Duration::from_millis(120)).await;
        let after = server.received_requests().await.unwrap_or_default().len();
        assert_eq!(pings, after, "no pings after cancellation");
    }

    #[tokio::test]
    async fn test_failed_ping_keeps_running() {
        let cancel = CancellationToken::new();
        let handle = spawn_keepalive(
            Arc::new(reqwest::Client::new()),
            "http://127.0.0.1:1/ping".to_string(),
            Duration::from_millis(20),
            cancel.clone(),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());
        cancel.cancel();
        handle.await.expect("keep-alive task panicked");
    }
}
