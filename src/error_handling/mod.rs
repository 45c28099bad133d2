//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions (startup, upstream attempts, universe resolution)
//! - Lookup statistics tracking (errors and info events)
//! - Categorization of upstream failures into counters
//!
//! None of these errors reach an HTTP caller directly. Upstream failures are
//! retried, counted and logged; a lookup that got no page at all is reported
//! as unavailable rather than as an error.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_upstream_error, update_error_stats};
pub use stats::ProcessingStats;
pub use types::{ErrorType, InfoType, InitializationError, ResolveError, UpstreamError};
