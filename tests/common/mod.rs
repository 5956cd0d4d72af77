// SPDX-License-Identifier: MIT

use axum::body::Body;
use axum::http::{header, Request, Response};
use mapty::config::Config;
use mapty::db::LocalStore;
use mapty::routes::create_router;
use mapty::AppState;
use std::sync::Arc;

/// Create a test app backed by an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(LocalStore::in_memory())
}

/// Create a test app around an existing store (e.g. one with saved workouts).
#[allow(dead_code)]
pub fn create_test_app_with_store(store: LocalStore) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default(), store)
}

/// Create a test app with custom configuration (e.g. a mock geocoder URL).
#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
    store: LocalStore,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, store).expect("Failed to build test state"));
    (create_router(state.clone()), state)
}

/// Build a JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request without a body.
#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
