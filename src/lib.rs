//! gamepass_proxy library: storefront gamepass lookups behind a cache
//!
//! Scrapes the gamepass list of a place from upstream storefront mirrors and
//! serves it as JSON. Upstream traffic goes through one rate limiter and a
//! retrying, mirror-failover fetcher; completed lookups are kept in a TTL
//! cache; places without passes can fall back to their universe's root place.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gamepass_proxy::{Config, GamepassService, ProcessingStats};
//! use gamepass_proxy::initialization::init_client;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let client = init_client(&config)?;
//! let service = Arc::new(GamepassService::from_config(
//!     &config,
//!     client,
//!     Arc::new(ProcessingStats::new()),
//! ));
//!
//! let lookup = service.get_gamepasses(1818, None).await;
//! println!("{} gamepasses ({:?})", lookup.records.len(), lookup.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
mod cache;
pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod keepalive;
mod models;
mod parse;
mod resolver;
mod server;
mod service;
mod utils;

// Re-export public API
pub use cache::{CacheEntryStats, CacheStats, GamepassCache};
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{
    ErrorType, InfoType, InitializationError, ProcessingStats, ResolveError, UpstreamError,
};
pub use fetch::{
    retry, Backoff, FetchOutcome, FetchResult, Fetcher, Retriable, RetryOutcome, RetryPolicy,
};
pub use keepalive::spawn_keepalive;
pub use models::{GamepassRecord, PlaceId, UniverseId};
pub use parse::extract_gamepasses;
pub use resolver::UniverseResolver;
pub use server::{build_router, start_server, AppState};
pub use service::{GamepassService, Lookup, LookupStatus};

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::app::{
    log_summary, print_error_statistics, shutdown_gracefully, spawn_summary_logger,
    wait_for_shutdown_signal,
};
use crate::config::SUMMARY_LOGGING_INTERVAL;
use crate::initialization::init_client;

/// Runs the HTTP service until Ctrl-C or SIGTERM.
///
/// Validates the configuration, builds the pipeline, starts the summary
/// logger (and the keep-alive pinger when configured), then serves requests.
/// On shutdown every background task is stopped and the final counters are
/// logged.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client cannot
/// be built, or the listen address cannot be bound.
pub async fn serve(config: Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let client = init_client(&config).context("Failed to initialize HTTP client")?;
    let stats = Arc::new(ProcessingStats::new());
    let service = Arc::new(GamepassService::from_config(
        &config,
        Arc::clone(&client),
        Arc::clone(&stats),
    ));

    log::info!(
        "Starting gamepass_proxy: {} mirror(s), cache TTL {}s, {} attempt(s) per mirror, {}ms between upstream requests",
        config.mirrors.len(),
        config.cache_ttl_secs,
        config.max_retries,
        config.rate_limit_interval_ms
    );

    let cancel = CancellationToken::new();
    let mut tasks = Vec::new();

    let start_time = Instant::now();
    let summary_service = Arc::clone(&service);
    tasks.push(spawn_summary_logger(
        SUMMARY_LOGGING_INTERVAL,
        cancel.clone(),
        move || {
            log_summary(
                start_time,
                summary_service.stats(),
                summary_service.cache().len(),
            )
        },
    ));

    if let Some(url) = &config.keepalive_url {
        tasks.push(spawn_keepalive(
            client,
            url.clone(),
            config.keepalive_interval(),
            cancel.clone(),
        ));
    }

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        signal_cancel.cancel();
    });

    let result = start_server(config.bind, AppState::new(service), cancel.clone()).await;

    shutdown_gracefully(cancel, tasks).await;
    print_error_statistics(&stats);
    result
}
