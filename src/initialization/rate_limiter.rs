//! Rate limiter initialization.
//!
//! This module provides the minimum-spacing limiter that every upstream
//! request goes through.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Shared limiter enforcing a minimum interval between outbound requests.
///
/// # Behavior
///
/// - Each caller reserves the next free slot (`previous grant + min_interval`,
///   or now if that is already past) under a short lock, then sleeps until its
///   slot outside the lock
/// - Two consecutive grants are therefore always at least `min_interval` apart,
///   however many tasks call `acquire()` at once
/// - Order between concurrent callers is whoever takes the lock first
/// - A zero interval disables spacing entirely
///
/// Time comes from `tokio::time`, so tests can run it on a paused clock.
pub struct RateLimiter {
    min_interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter; the first `acquire()` is granted immediately.
    pub fn new(min_interval: Duration) -> Self {
        RateLimiter {
            min_interval,
            last_grant: Mutex::new(None),
        }
    }

    /// Waits for the next slot and returns the instant it was granted at.
    pub async fn acquire(&self) -> Instant {
        if self.min_interval.is_zero() {
            return Instant::now();
        }

        let grant_at = {
            let mut last = self
                .last_grant
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let grant_at = match *last {
                Some(previous) => now.max(previous + self.min_interval),
                None => now,
            };
            *last = Some(grant_at);
            grant_at
        };

        if grant_at > Instant::now() {
            log::trace!(
                "Rate limiter delaying request by {}ms",
                (grant_at - Instant::now()).as_millis()
            );
            tokio::time::sleep_until(grant_at).await;
        }
        grant_at
    }

    /// Configured spacing between grants.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Initializes the shared upstream rate limiter.
///
/// # Arguments
///
/// * `min_interval` - Minimum spacing between two granted requests (zero disables limiting)
pub fn init_rate_limiter(min_interval: Duration) -> Arc<RateLimiter> {
    if min_interval.is_zero() {
        log::warn!("Upstream rate limiting disabled (interval is 0)");
    }
    Arc::new(RateLimiter::new(min_interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let start = Instant::now();
        let granted = limiter.acquire().await;
        assert_eq!(granted, start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_acquires_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        let first = limiter.acquire().await;
        let second = limiter.acquire().await;
        let third = limiter.acquire().await;
        assert!(second - first >= Duration::from_millis(200));
        assert!(third - second >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_limiter_does_not_delay() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        let before = Instant::now();
        let granted = limiter.acquire().await;
        assert_eq!(granted, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquires_keep_minimum_spacing() {
        let interval = Duration::from_millis(100);
        let limiter = Arc::new(RateLimiter::new(interval));
        let start = Instant::now();

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();

        let mut grants = Vec::new();
        for result in futures::future::join_all(handles).await {
            grants.push(result.expect("acquire task panicked"));
        }
        grants.sort();

        for pair in grants.windows(2) {
            assert!(
                pair[1] - pair[0] >= interval,
                "grants {:?} apart, expected at least {:?}",
                pair[1] - pair[0],
                interval
            );
        }
        // The last caller waited for every slot before it
        assert!(Instant::now() - start >= interval * 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_disables_limiting() {
        let limiter = init_rate_limiter(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert_eq!(Instant::now(), start);
        assert!(limiter.min_interval().is_zero());
    }
}
