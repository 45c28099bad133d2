//! Liveness and JSON status handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::super::types::{AppState, ErrorCounts, InfoCounts, StatusResponse};
use crate::error_handling::{ErrorType, InfoType};

pub async fn ping_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// JSON status endpoint with lookup and upstream counters
pub async fn status_handler(State(state): State<AppState>) -> Response {
    let stats = state.service.stats();
    let elapsed = state.start_time.elapsed().as_secs_f64();
    let lookups = stats.lookups();
    let rate = if elapsed > 0.0 {
        lookups as f64 / elapsed
    } else {
        0.0
    };

    let response = StatusResponse {
        uptime_seconds: elapsed,
        lookups,
        rate_per_second: rate,
        cache_entries: state.service.cache().len(),
        errors: ErrorCounts {
            total: stats.total_errors(),
            timeout: stats.get_error_count(ErrorType::UpstreamTimeout),
            connection_error: stats.get_error_count(ErrorType::UpstreamConnect),
            rate_limited: stats.get_error_count(ErrorType::UpstreamTooManyRequests),
            http_error: stats.get_error_count(ErrorType::UpstreamStatus),
            body_error: stats.get_error_count(ErrorType::UpstreamBody),
            other_error: stats.get_error_count(ErrorType::UpstreamOther),
            fetch_exhausted: stats.get_error_count(ErrorType::FetchExhausted),
            resolver_failure: stats.get_error_count(ErrorType::ResolverFailure),
        },
        info: InfoCounts {
            total: stats.total_info(),
            cache_hit: stats.get_info_count(InfoType::CacheHit),
            cache_miss: stats.get_info_count(InfoType::CacheMiss),
            empty_page: stats.get_info_count(InfoType::EmptyPage),
            universe_fallback: stats.get_info_count(InfoType::UniverseFallback),
        },
    };

    (StatusCode::OK, Json(response)).into_response()
}

pub async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not_found" }))).into_response()
}
