//! Cache inspection handlers.

use axum::{extract::State, Json};

use super::super::types::{AppState, ClearResponse};
use crate::cache::CacheStats;

/// `GET /cache/stats`: per-entry age and remaining TTL.
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.service.cache().stats())
}

/// `GET /cache/clear`: drops every entry.
pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let items_removed = state.service.cache().clear();
    log::info!("Cache cleared ({} entries removed)", items_removed);
    Json(ClearResponse {
        status: "cleared",
        items_removed,
    })
}
