//! Prometheus metrics handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::types::AppState;
use crate::error_handling::{ErrorType, InfoType};

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let stats = state.service.stats();

    let metrics = format!(
        r#"# HELP gamepass_proxy_lookups_total Gamepass lookups served
# TYPE gamepass_proxy_lookups_total counter
gamepass_proxy_lookups_total {}

# HELP gamepass_proxy_cache_hits_total Lookups answered from the cache
# TYPE gamepass_proxy_cache_hits_total counter
gamepass_proxy_cache_hits_total {}

# HELP gamepass_proxy_cache_entries Places currently cached
# TYPE gamepass_proxy_cache_entries gauge
gamepass_proxy_cache_entries {}

# HELP gamepass_proxy_upstream_errors_total Failed upstream attempts and lookups
# TYPE gamepass_proxy_upstream_errors_total counter
gamepass_proxy_upstream_errors_total {}

# HELP gamepass_proxy_upstream_unavailable_total Lookups that obtained no page
# TYPE gamepass_proxy_upstream_unavailable_total counter
gamepass_proxy_upstream_unavailable_total {}

# HELP gamepass_proxy_uptime_seconds Seconds since the server started
# TYPE gamepass_proxy_uptime_seconds gauge
gamepass_proxy_uptime_seconds {}
"#,
        stats.lookups(),
        stats.get_info_count(InfoType::CacheHit),
        state.service.cache().len(),
        stats.total_errors(),
        stats.get_error_count(ErrorType::FetchExhausted),
        state.start_time.elapsed().as_secs_f64(),
    );

    (StatusCode::OK, metrics).into_response()
}
