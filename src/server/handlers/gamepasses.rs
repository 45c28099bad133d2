//! Gamepass lookup handler.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::super::types::{AppState, ErrorResponse, UpstreamFailureResponse};
use crate::models::{PlaceId, UniverseId};

#[derive(Debug, Deserialize)]
pub struct GamepassQuery {
    #[serde(rename = "universeId")]
    universe_id: Option<UniverseId>,
}

/// `GET /gamepasses/{place_id}[?universeId=N]`
///
/// 200 with the (possibly empty) record array, 502 when no page could be
/// fetched on any path, 400 for ids that are not positive integers.
pub async fn gamepasses_handler(
    State(state): State<AppState>,
    place_id: Result<Path<PlaceId>, PathRejection>,
    query: Result<Query<GamepassQuery>, QueryRejection>,
) -> Response {
    let place_id = match place_id {
        Ok(Path(id)) if id > 0 => id,
        Ok(Path(id)) => {
            return bad_request("invalid_place_id", format!("placeId must be positive, got {}", id))
        }
        Err(rejection) => return bad_request("invalid_place_id", rejection.body_text()),
    };
    let universe_id = match query {
        Ok(Query(GamepassQuery { universe_id: Some(id) })) if id <= 0 => {
            return bad_request(
                "invalid_universe_id",
                format!("universeId must be positive, got {}", id),
            );
        }
        Ok(Query(query)) => query.universe_id,
        Err(rejection) => return bad_request("invalid_universe_id", rejection.body_text()),
    };

    let lookup = state.service.get_gamepasses(place_id, universe_id).await;
    if lookup.is_unavailable() {
        let body = UpstreamFailureResponse {
            error: "failed_to_fetch",
            place_id,
            gamepasses: Vec::new(),
        };
        return (StatusCode::BAD_GATEWAY, Json(body)).into_response();
    }

    (StatusCode::OK, Json(lookup.records.as_slice())).into_response()
}

fn bad_request(error: &'static str, detail: String) -> Response {
    log::debug!("Rejected request: {}", detail);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error, detail })).into_response()
}
