// SPDX-License-Identifier: MIT

//! Reverse geocoding client tests against a mock Nominatim server.

use axum::http::StatusCode;
use mapty::config::Config;
use mapty::db::LocalStore;
use mapty::error::AppError;
use mapty::models::{Coordinates, Place};
use mapty::services::GeocodingClient;
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

mod common;

use common::{body_json, create_test_app_with_config, empty_request, json_request};

fn client(base_url: &str) -> GeocodingClient {
    GeocodingClient::new(base_url, "mapty-tests", Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_reverse_lookup_reads_city_and_country() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/reverse")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("format".into(), "jsonv2".into()),
            Matcher::UrlEncoded("lat".into(), "52.52".into()),
            Matcher::UrlEncoded("lon".into(), "13.405".into()),
        ]))
        .match_header("user-agent", "mapty-tests")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"place_id":1,"address":{"city":"Berlin","country":"Germany","postcode":"10117"}}"#)
        .create_async()
        .await;

    let place = client(&server.url())
        .reverse(Coordinates::new(52.52, 13.405))
        .await;

    assert_eq!(place, Some(Place::new("Berlin", "Germany")));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_town_used_when_no_city() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/reverse")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"address":{"town":"Zermatt","country":"Switzerland"}}"#)
        .create_async()
        .await;

    let place = client(&server.url())
        .lookup(Coordinates::new(46.02, 7.75))
        .await
        .unwrap();
    assert_eq!(place, Place::new("Zermatt", "Switzerland"));
}

#[tokio::test]
async fn test_http_error_yields_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/reverse")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("busy")
        .create_async()
        .await;

    let geocoder = client(&server.url());
    let err = geocoder.lookup(Coordinates::new(0.0, 0.0)).await.unwrap_err();
    assert!(matches!(err, AppError::Geocoding(_)));
    assert_eq!(geocoder.reverse(Coordinates::new(0.0, 0.0)).await, None);
}

#[tokio::test]
async fn test_unparseable_body_yields_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/reverse")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>rate limited</html>")
        .create_async()
        .await;

    assert_eq!(
        client(&server.url()).reverse(Coordinates::new(0.0, 0.0)).await,
        None
    );
}

#[tokio::test]
async fn test_missing_address_yields_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/reverse")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"error":"Unable to geocode"}"#)
        .create_async()
        .await;

    assert_eq!(
        client(&server.url()).reverse(Coordinates::new(0.0, 0.0)).await,
        None
    );
}

#[tokio::test]
async fn test_unreachable_server_yields_none() {
    let geocoder = client("http://127.0.0.1:9");
    assert_eq!(geocoder.reverse(Coordinates::new(1.0, 1.0)).await, None);
}

#[tokio::test]
async fn test_submit_lists_workout_then_patches_place_name() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/reverse")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "52.52".into()),
            Matcher::UrlEncoded("lon".into(), "13.405".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"address":{"city":"Berlin","country":"Germany"}}"#)
        .create_async()
        .await;

    let config = Config {
        geocoder_url: server.url(),
        ..Config::test_default()
    };
    let (app, state) = create_test_app_with_config(config, LocalStore::in_memory());

    for (uri, body) in [
        ("/api/map/load", json!({ "lat": 52.5, "lng": 13.4 })),
        ("/api/map/click", json!({ "lat": 52.52, "lng": 13.405 })),
    ] {
        let response = app.clone().oneshot(json_request("POST", uri, body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/workouts",
            json!({ "type": "running", "distance": 5, "duration": 25, "metric": 170 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Listed right away, before the place name is known
    let view = body_json(response).await;
    let title = view["workouts"][0]["title"].as_str().unwrap();
    assert!(title.starts_with("Running on "));
    assert!(!title.contains(" in "));

    let mut resolved = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let workouts = state.workouts.lock().await;
        if workouts.workouts()[0]
            .description()
            .is_some_and(|d| d.ends_with(" in Berlin, Germany"))
        {
            resolved = true;
            break;
        }
    }
    assert!(resolved, "place name was never applied");
    mock.assert_async().await;

    let response = app.oneshot(empty_request("GET", "/api/view")).await.unwrap();
    let view = body_json(response).await;
    assert!(view["workouts"][0]["title"]
        .as_str()
        .unwrap()
        .ends_with(" in Berlin, Germany"));
    assert!(view["markers"][0]["popup_content"]
        .as_str()
        .unwrap()
        .ends_with(" in Berlin, Germany"));

    let workouts = state.workouts.lock().await;
    let saved = workouts.store().load_workouts().unwrap().unwrap();
    assert_eq!(saved[0].description(), workouts.workouts()[0].description());
}
