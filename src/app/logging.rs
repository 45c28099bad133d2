//! Periodic summary logging.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use tokio_util::sync::CancellationToken;

use crate::error_handling::{InfoType, ProcessingStats};

/// Logs one summary line: lookups served, cache hit ratio and error total.
///
/// # Arguments
///
/// * `start_time` - When the service started
/// * `stats` - Shared lookup counters
/// * `cache_entries` - Current number of cache entries
pub fn log_summary(start_time: Instant, stats: &ProcessingStats, cache_entries: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let lookups = stats.lookups();
    let rate = if elapsed_secs > 0.0 {
        lookups as f64 / elapsed_secs
    } else {
        0.0
    };
    let hits = stats.get_info_count(InfoType::CacheHit);
    let hit_ratio = if lookups > 0 {
        hits as f64 / lookups as f64 * 100.0
    } else {
        0.0
    };
    info!(
        "Served {} lookups in {:.0} seconds (~{:.2}/sec), cache hits {:.1}%, {} cached places, {} upstream errors",
        lookups,
        elapsed_secs,
        rate,
        hit_ratio,
        cache_entries,
        stats.total_errors()
    );
}

/// Spawns a task calling `summary` every `period` until `cancel` fires.
///
/// The first tick is skipped so nothing is logged at startup.
pub fn spawn_summary_logger<F>(
    period: Duration,
    cancel: CancellationToken,
    summary: F,
) -> tokio::task::JoinHandle<()>
where
    F: Fn() + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => summary(),
            }
        }
    })
}
