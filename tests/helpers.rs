// Shared test helpers: a fake upstream and service/router builders.
//
// Every test starts its own `MockServer`, which plays both the fragment
// mirror and the catalog API.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gamepass_proxy::{build_router, AppState, Config, GamepassService, ProcessingStats};

pub const FRAGMENT_PATH: &str = "/games/getgamepassesinnerpartial";

/// Config pointing every upstream at `server`, with no spacing or backoff.
#[allow(dead_code)] // Used by other test files
pub fn test_config(server: &MockServer) -> Config {
    Config {
        mirrors: vec![format!(
            "{}{}?startIndex=0&maxRows=50&placeId={{place_id}}",
            server.uri(),
            FRAGMENT_PATH
        )],
        catalog_base_url: server.uri(),
        max_retries: 2,
        retry_base_delay_ms: 0,
        rate_limit_interval_ms: 0,
        ..Config::default()
    }
}

#[allow(dead_code)]
pub fn build_service(config: &Config) -> Arc<GamepassService> {
    Arc::new(GamepassService::from_config(
        config,
        Arc::new(reqwest::Client::new()),
        Arc::new(ProcessingStats::new()),
    ))
}

#[allow(dead_code)]
pub fn build_app(config: &Config) -> (Router, Arc<GamepassService>) {
    let service = build_service(config);
    let router = build_router(AppState::new(Arc::clone(&service)));
    (router, service)
}

/// One storefront card in the markup the mirrors serve.
#[allow(dead_code)]
pub fn card(pass_id: i64, name: &str, price: i64) -> String {
    format!(
        r#"<li class="list-item real-game-pass">
            <a href="/game-pass/{id}/{name}"><img src="https://tr.rbxcdn.com/{id}/150/150/Image/Png"/></a>
            <div class="store-card-name" title="{name}">{name}</div>
            <div class="store-card-price"><span class="text-robux">{price}</span></div>
            <div class="store-card-footer">
                <button class="PurchaseButton" data-product-id="{product}" data-expected-seller-id="77" data-expected-price="{price}">Buy</button>
            </div>
        </li>"#,
        id = pass_id,
        name = name,
        price = price,
        product = pass_id + 1000,
    )
}

/// Serves `body` with status 200 for one place id.
#[allow(dead_code)]
pub async fn mount_fragment(server: &MockServer, place_id: i64, body: String) {
    Mock::given(method("GET"))
        .and(path(FRAGMENT_PATH))
        .and(query_param("placeId", place_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves a status with no body for one place id.
#[allow(dead_code)]
pub async fn mount_fragment_status(server: &MockServer, place_id: i64, status: u16) {
    Mock::given(method("GET"))
        .and(path(FRAGMENT_PATH))
        .and(query_param("placeId", place_id.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Maps `universe_id` to `root_place_id` in the catalog API.
#[allow(dead_code)]
pub async fn mount_catalog(server: &MockServer, universe_id: i64, root_place_id: i64) {
    Mock::given(method("GET"))
        .and(path("/v1/games"))
        .and(query_param("universeIds", universe_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "id": universe_id, "rootPlaceId": root_place_id }]
        })))
        .mount(server)
        .await;
}

/// Number of fragment requests the server received for a place.
#[allow(dead_code)]
pub async fn fragment_requests(server: &MockServer, place_id: i64) -> usize {
    let needle = format!("placeId={}", place_id);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == FRAGMENT_PATH)
        .filter(|r| {
            r.url
                .query()
                .is_some_and(|q| q.split('&').any(|pair| pair == needle))
        })
        .count()
}

/// Sends a GET through the router and returns status and JSON body.
#[allow(dead_code)]
pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Router should not fail");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).expect("Body should be JSON");
    (status, json)
}
