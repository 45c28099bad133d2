//! Process-level plumbing around the service.
//!
//! Periodic summary logging, shutdown handling and statistics printing used by
//! [`serve`](crate::serve).

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::{log_summary, spawn_summary_logger};
pub use shutdown::{shutdown_gracefully, wait_for_shutdown_signal};
pub use statistics::print_error_statistics;
