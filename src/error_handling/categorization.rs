//! Error categorization.

use super::stats::ProcessingStats;
use super::types::{ErrorType, UpstreamError};

/// Categorizes a single failed upstream attempt into an `ErrorType`.
///
/// Status-based variants map directly; transport errors are split by what
/// reqwest reports (timeout before connect, since a slow connect is reported
/// as both).
pub fn categorize_upstream_error(error: &UpstreamError) -> ErrorType {
    match error {
        UpstreamError::TooManyRequests => ErrorType::UpstreamTooManyRequests,
        UpstreamError::Status(_) => ErrorType::UpstreamStatus,
        UpstreamError::Transport(e) => {
            if e.is_timeout() {
                ErrorType::UpstreamTimeout
            } else if e.is_connect() {
                ErrorType::UpstreamConnect
            } else if e.is_body() || e.is_decode() {
                ErrorType::UpstreamBody
            } else {
                ErrorType::UpstreamOther
            }
        }
    }
}

/// Records a failed upstream attempt in the statistics.
pub fn update_error_stats(stats: &ProcessingStats, error: &UpstreamError) {
    stats.increment_error(categorize_upstream_error(error));
}
