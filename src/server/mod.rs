//! HTTP front end.
//!
//! Endpoints:
//! - `/gamepasses/{place_id}` - gamepass lookup (optional `universeId` query)
//! - `/ping` - liveness
//! - `/cache/stats` - cache entry ages and remaining TTLs
//! - `/cache/clear` - drop every cache entry
//! - `/status` - JSON lookup and upstream counters
//! - `/metrics` - Prometheus-compatible metrics

mod handlers;
mod types;

use std::net::SocketAddr;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;

use handlers::{
    cache_clear_handler, cache_stats_handler, gamepasses_handler, metrics_handler,
    not_found_handler, ping_handler, status_handler,
};
pub use types::AppState;

/// Builds the router over shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/gamepasses/{place_id}", get(gamepasses_handler))
        .route("/ping", get(ping_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/clear", get(cache_clear_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Binds `bind` and serves until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish after cancellation.
pub async fn start_server(
    bind: SocketAddr,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind server to {}", bind))?;
    let local_addr = listener.local_addr().context("Failed to read bound address")?;

    log::info!("Listening on http://{}/", local_addr);
    log::info!("  - Gamepasses: http://{}/gamepasses/{{place_id}}", local_addr);
    log::info!("  - Status: http://{}/status", local_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Server error")?;

    log::info!("Server stopped");
    Ok(())
}
