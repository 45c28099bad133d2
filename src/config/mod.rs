//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, retry defaults, upstream mirrors)
//! - CLI / environment option types and validation

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
