//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;
use crate::error_handling::InitializationError;

/// Upper bound on the TCP connect phase, independent of the overall timeout.
const CONNECT_TIMEOUT_CAP: Duration = Duration::from_secs(5);

/// Initializes the upstream HTTP client.
///
/// Creates a `reqwest::Client` configured with:
/// - the browser-like User-Agent from the configuration
/// - the per-request timeout from the configuration
/// - a connect timeout capped at 5s so a dead mirror fails fast and the next
///   one gets a chance within the same lookup
///
/// The same client is shared by the fetcher, the resolver and the keep-alive
/// task so they reuse one connection pool.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails,
/// for example when the User-Agent is not a valid header value.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, InitializationError> {
    let timeout = config.request_timeout();
    let client = ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT_CAP))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
