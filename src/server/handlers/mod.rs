//! HTTP handlers.

mod cache;
mod gamepasses;
mod metrics;
mod status;

pub use cache::{cache_clear_handler, cache_stats_handler};
pub use gamepasses::gamepasses_handler;
pub use metrics::metrics_handler;
pub use status::{not_found_handler, ping_handler, status_handler};
