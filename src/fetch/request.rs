//! Fragment fetching with retries and mirror failover.

use std::sync::Arc;

use reqwest::StatusCode;

use super::retry::{retry, RetryOutcome, RetryPolicy};
use crate::config::{GAMEPASS_MARKER, HTTP_STATUS_TOO_MANY_REQUESTS, PLACE_ID_PLACEHOLDER};
use crate::error_handling::{update_error_stats, InfoType, ProcessingStats, UpstreamError};
use crate::initialization::RateLimiter;
use crate::models::PlaceId;

/// Browser-like request headers sent with every fragment request.
///
/// The User-Agent is set on the client itself; these complete the picture for
/// mirrors that also look at content negotiation and the referer.
pub(crate) struct RequestHeaders;

impl RequestHeaders {
    pub(crate) fn apply_to_request_builder(
        builder: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        builder
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::REFERER, "https://www.roblox.com/")
            .header(
                reqwest::header::HeaderName::from_static("x-requested-with"),
                "XMLHttpRequest",
            )
    }
}

/// Classification of a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 200 and the body lists at least one gamepass card.
    Success(String),
    /// 200 without any gamepass card: the place has none. Cacheable.
    EmptyButValid(String),
    /// Retries ran out on an error status other than 429.
    TransientFailure { status: u16 },
    /// Retries ran out on 429 or on transport errors.
    PermanentFailure,
}

impl FetchOutcome {
    /// The HTML payload, if a 200 response was obtained.
    pub fn html(&self) -> Option<&str> {
        match self {
            FetchOutcome::Success(html) | FetchOutcome::EmptyButValid(html) => Some(html),
            FetchOutcome::TransientFailure { .. } | FetchOutcome::PermanentFailure => None,
        }
    }

    /// Whether the fetch completed, i.e. produced a result that may be cached.
    pub fn is_completed(&self) -> bool {
        self.html().is_some()
    }
}

/// Outcome of a fetch plus the number of network attempts it took across all
/// mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// How the fetch ended.
    pub outcome: FetchOutcome,
    /// Network attempts made across every mirror tried.
    pub attempts: u32,
}

/// A 200 response, split by whether it lists gamepasses.
enum Page {
    Listed(String),
    Empty(String),
}

/// Rate-limited, retrying client for the storefront fragment.
pub struct Fetcher {
    client: Arc<reqwest::Client>,
    limiter: Arc<RateLimiter>,
    mirrors: Vec<String>,
    policy: RetryPolicy,
    stats: Arc<ProcessingStats>,
}

impl Fetcher {
    /// `mirrors` are URL templates containing `{place_id}`, tried in order.
    pub fn new(
        client: Arc<reqwest::Client>,
        limiter: Arc<RateLimiter>,
        mirrors: Vec<String>,
        policy: RetryPolicy,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Fetcher {
            client,
            limiter,
            mirrors,
            policy,
            stats,
        }
    }

    /// Fetches the gamepass fragment for a place.
    ///
    /// Each mirror gets the full retry budget. The first `Success` is returned
    /// immediately; otherwise an `EmptyButValid` from any mirror wins over
    /// failures, and if every mirror failed the last mirror's failure is
    /// reported.
    pub async fn fetch(&self, place_id: PlaceId) -> FetchResult {
        let mut attempts = 0;
        let mut empty_page = None;
        let mut last_failure = FetchOutcome::PermanentFailure;

        for template in &self.mirrors {
            let url = template.replace(PLACE_ID_PLACEHOLDER, &place_id.to_string());
            let result = self.fetch_from_mirror(&url, place_id).await;
            attempts += result.attempts;

            match result.outcome {
                outcome @ FetchOutcome::Success(_) => return FetchResult { outcome, attempts },
                FetchOutcome::EmptyButValid(html) => {
                    empty_page.get_or_insert(html);
                }
                failure => last_failure = failure,
            }
        }

        let outcome = match empty_page {
            Some(html) => {
                log::debug!("Place {} lists no gamepasses", place_id);
                self.stats.increment_info(InfoType::EmptyPage);
                FetchOutcome::EmptyButValid(html)
            }
            None => last_failure,
        };
        FetchResult { outcome, attempts }
    }

    async fn fetch_from_mirror(&self, url: &str, place_id: PlaceId) -> FetchResult {
        let outcome = retry(&self.policy, |attempt| self.attempt(url, place_id, attempt)).await;
        let attempts = outcome.attempts();

        let outcome = match outcome {
            RetryOutcome::Success {
                value: Page::Listed(html),
                ..
            } => FetchOutcome::Success(html),
            RetryOutcome::Success {
                value: Page::Empty(html),
                ..
            } => FetchOutcome::EmptyButValid(html),
            RetryOutcome::Exhausted { last_error, .. } => {
                log::warn!(
                    "Mirror gave up on place {} after {} attempts: {} ({})",
                    place_id,
                    attempts,
                    last_error,
                    url
                );
                match last_error {
                    UpstreamError::Status(status) => FetchOutcome::TransientFailure { status },
                    UpstreamError::TooManyRequests | UpstreamError::Transport(_) => {
                        FetchOutcome::PermanentFailure
                    }
                }
            }
        };
        FetchResult { outcome, attempts }
    }

    /// One network attempt: waits for the limiter, then GETs and classifies.
    async fn attempt(
        &self,
        url: &str,
        place_id: PlaceId,
        attempt: u32,
    ) -> Result<Page, UpstreamError> {
        self.limiter.acquire().await;
        log::debug!("Fetching place {} (attempt {}): {}", place_id, attempt + 1, url);

        let result = self.send(url).await;
        if let Err(ref error) = result {
            update_error_stats(&self.stats, error);
            log::debug!(
                "Attempt {} for place {} failed: {}",
                attempt + 1,
                place_id,
                error
            );
        }
        result
    }

    async fn send(&self, url: &str) -> Result<Page, UpstreamError> {
        let request = RequestHeaders::apply_to_request_builder(self.client.get(url));
        let response = request.send().await?;
        let status = response.status();

        if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
            return Err(UpstreamError::TooManyRequests);
        }
        if status != StatusCode::OK {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        if body.contains(GAMEPASS_MARKER) {
            Ok(Page::Listed(body))
        } else {
            Ok(Page::Empty(body))
        }
    }
}
