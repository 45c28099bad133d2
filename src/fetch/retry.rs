//! Retry combinator with per-error backoff curves.
//!
//! The policy is pure (attempt number in, delay out) and the loop sleeps on
//! `tokio::time`, so both can be tested on a paused clock without real delays.

use std::future::Future;
use std::time::Duration;

use crate::error_handling::UpstreamError;

/// Shape of the delay inserted after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * 2^attempt`
    Exponential,
    /// `base * (attempt + 1)`
    Linear,
}

/// Errors that know which backoff curve should follow them.
pub trait Retriable {
    /// Curve used for the delay after this error.
    fn backoff(&self) -> Backoff;
}

impl Retriable for UpstreamError {
    /// Rate limiting backs off exponentially; everything else linearly.
    fn backoff(&self) -> Backoff {
        match self {
            UpstreamError::TooManyRequests => Backoff::Exponential,
            UpstreamError::Status(_) | UpstreamError::Transport(_) => Backoff::Linear,
        }
    }
}

/// Attempt budget and base delay for one retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` includes the initial attempt; zero is treated as one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Attempts allowed, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after attempt number `attempt` (0-based) failed.
    pub fn delay_for(&self, backoff: Backoff, attempt: u32) -> Duration {
        let multiplier = match backoff {
            Backoff::Exponential => 2u32.checked_pow(attempt).unwrap_or(u32::MAX),
            Backoff::Linear => attempt.saturating_add(1),
        };
        self.base_delay.saturating_mul(multiplier)
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// An attempt succeeded.
    Success {
        /// Value returned by the successful attempt.
        value: T,
        /// Attempts made, the successful one included.
        attempts: u32,
    },
    /// Every attempt failed.
    Exhausted {
        /// Error of the final attempt.
        last_error: E,
        /// Attempts made.
        attempts: u32,
    },
}

impl<T, E> RetryOutcome<T, E> {
    /// Number of attempts made, whichever way it ended.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Success { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Runs `operation` until it succeeds or the policy's attempt budget is spent.
///
/// The operation receives the 0-based attempt number. After a failure the
/// loop sleeps for the delay the error's backoff curve prescribes; no sleep
/// follows the final attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> RetryOutcome<T, E>
where
    E: Retriable + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                return RetryOutcome::Success {
                    value,
                    attempts: attempt + 1,
                }
            }
            Err(error) => {
                if attempt + 1 >= policy.max_attempts {
                    return RetryOutcome::Exhausted {
                        last_error: error,
                        attempts: attempt + 1,
                    };
                }
                let delay = policy.delay_for(error.backoff(), attempt);
                log::debug!(
                    "Attempt {}/{} failed ({}), retrying in {}ms",
                    attempt + 1,
                    policy.max_attempts,
                    error,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        let delays: Vec<u128> = (0..4)
            .map(|a| policy.delay_for(Backoff::Exponential, a).as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800]);
    }

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        let delays: Vec<u128> = (0..4)
            .map(|a| policy.delay_for(Backoff::Linear, a).as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 300, 400]);
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        let delay = policy.delay_for(Backoff::Exponential, 200);
        assert!(delay >= Duration::from_secs(u32::MAX as u64));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[test]
    fn test_upstream_error_backoff_curves() {
        assert_eq!(UpstreamError::TooManyRequests.backoff(), Backoff::Exponential);
        assert_eq!(UpstreamError::Status(503).backoff(), Backoff::Linear);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_rate_limits_waits_exponentially() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let outcome = retry(&policy, |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(UpstreamError::TooManyRequests)
                } else {
                    Ok("page")
                }
            }
        })
        .await;

        match outcome {
            RetryOutcome::Success { value, attempts } => {
                assert_eq!(value, "page");
                assert_eq!(attempts, 3);
            }
            RetryOutcome::Exhausted { .. } => panic!("third attempt should succeed"),
        }
        // 100ms after the first 429, 200ms after the second
        assert_eq!(Instant::now() - start, Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_keeps_last_error_and_skips_final_sleep() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let start = Instant::now();

        let outcome: RetryOutcome<(), UpstreamError> =
            retry(&policy, |attempt| async move { Err(UpstreamError::Status(500 + attempt as u16)) })
                .await;

        assert_eq!(outcome.attempts(), 3);
        match outcome {
            RetryOutcome::Exhausted { last_error, .. } => {
                assert!(matches!(last_error, UpstreamError::Status(502)));
            }
            RetryOutcome::Success { .. } => panic!("every attempt failed"),
        }
        // Linear: 100ms + 200ms, nothing after the third attempt
        assert_eq!(Instant::now() - start, Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_budget_never_sleeps() {
        let policy = RetryPolicy::new(1, Duration::from_secs(10));
        let start = Instant::now();
        let outcome: RetryOutcome<(), UpstreamError> =
            retry(&policy, |_| async { Err(UpstreamError::TooManyRequests) }).await;
        assert_eq!(outcome.attempts(), 1);
        assert_eq!(Instant::now(), start);
    }
}
