//! Server state and response bodies.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::models::{GamepassRecord, PlaceId};
use crate::service::GamepassService;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    /// The lookup pipeline
    pub service: Arc<GamepassService>,
    /// When the state was created, for uptime and rates
    pub start_time: Arc<Instant>,
}

impl AppState {
    /// Wraps a service, starting the uptime clock now.
    pub fn new(service: Arc<GamepassService>) -> Self {
        AppState {
            service,
            start_time: Arc::new(Instant::now()),
        }
    }
}

/// Body of a 4xx response.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub detail: String,
}

/// Body of the 502 returned when no page could be fetched.
#[derive(Serialize)]
pub struct UpstreamFailureResponse {
    pub error: &'static str,
    #[serde(rename = "placeId")]
    pub place_id: PlaceId,
    pub gamepasses: Vec<GamepassRecord>,
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub status: &'static str,
    pub items_removed: usize,
}

/// JSON response for `/status`
#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: f64,
    pub lookups: usize,
    pub rate_per_second: f64,
    pub cache_entries: usize,
    pub errors: ErrorCounts,
    pub info: InfoCounts,
}

#[derive(Serialize)]
pub struct ErrorCounts {
    pub total: usize,
    pub timeout: usize,
    pub connection_error: usize,
    pub rate_limited: usize,
    pub http_error: usize,
    pub body_error: usize,
    pub other_error: usize,
    pub fetch_exhausted: usize,
    pub resolver_failure: usize,
}

#[derive(Serialize)]
pub struct InfoCounts {
    pub total: usize,
    pub cache_hit: usize,
    pub cache_miss: usize,
    pub empty_page: usize,
    pub universe_fallback: usize,
}
