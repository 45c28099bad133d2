//! Upstream fragment fetching.
//!
//! [`retry`] holds the backoff policy and the generic retry loop, [`request`]
//! the fragment client built on it.

mod request;
mod retry;

pub use request::{FetchOutcome, FetchResult, Fetcher};
pub use retry::{retry, Backoff, RetryOutcome, RetryPolicy, Retriable};
