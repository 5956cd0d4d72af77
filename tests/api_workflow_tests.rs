// SPDX-License-Identifier: MIT

//! End-to-end workout flows through the HTTP API.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, empty_request, json_request};

/// Click the map, submit a workout and return the created workout's id.
async fn create_workout(app: &axum::Router, lat: f64, lng: f64, body: serde_json::Value) -> String {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/map/click", json!({ "lat": lat, "lng": lng })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/workouts", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let view = body_json(response).await;
    let items = view["workouts"].as_array().unwrap();
    items.last().unwrap()["workout_id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_create_running_workout() {
    let (app, state) = create_test_app();

    app.clone()
        .oneshot(json_request("POST", "/api/map/load", json!({ "lat": 10.0, "lng": 20.0 })))
        .await
        .unwrap();

    let id = create_workout(
        &app,
        10.0,
        20.0,
        json!({ "type": "running", "distance": 5, "duration": 30, "metric": 160 }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/view"))
        .await
        .unwrap();
    let view = body_json(response).await;

    assert_eq!(view["form"]["state"], "idle");
    assert_eq!(view["bulk_controls_visible"], true);
    assert_eq!(view["markers"].as_array().unwrap().len(), 1);
    assert_eq!(view["markers"][0]["popup_class"], "running-popup");
    assert_eq!(view["workouts"][0]["details"][2]["value"], "6.0");
    assert_eq!(view["workouts"][0]["details"][2]["unit"], "min/km");

    let workouts = state.workouts.lock().await;
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts.workouts()[0].id().as_str(), id);
    assert_eq!(workouts.workouts()[0].pace(), Some(6.0));
}

#[tokio::test]
async fn test_edit_keeps_id_and_recomputes_pace() {
    let (app, state) = create_test_app();
    let id = create_workout(
        &app,
        10.0,
        20.0,
        json!({ "type": "running", "distance": 5, "duration": 30, "metric": 160 }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(empty_request("POST", &format!("/api/workouts/{}/edit", id)))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["workouts"][0]["editing"], true);
    assert_eq!(view["banner"], "Save to continue.");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/workouts/{}", id),
            json!({ "distance": 10, "duration": 30, "metric": 160 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["workouts"][0]["workout_id"], id.as_str());
    assert_eq!(view["workouts"][0]["details"][2]["value"], "3.0");
    assert_eq!(view["workouts"][0]["editing"], false);

    let workouts = state.workouts.lock().await;
    assert_eq!(workouts.workouts()[0].pace(), Some(3.0));
    let saved = workouts.store().load_workouts().unwrap().unwrap();
    assert_eq!(saved[0].distance(), 10.0);
}

#[tokio::test]
async fn test_cycling_speed_via_api() {
    let (app, state) = create_test_app();
    create_workout(
        &app,
        0.0,
        0.0,
        json!({ "type": "cycling", "distance": 20, "duration": 60, "metric": 300 }),
    )
    .await;

    let workouts = state.workouts.lock().await;
    assert_eq!(workouts.workouts()[0].speed(), Some(20.0));
}

#[tokio::test]
async fn test_delete_all_hides_controls() {
    let (app, state) = create_test_app();
    app.clone()
        .oneshot(json_request("POST", "/api/map/load", json!({ "lat": 0.0, "lng": 0.0 })))
        .await
        .unwrap();

    for distance in [3, 5, 8] {
        create_workout(
            &app,
            1.0,
            1.0,
            json!({ "type": "running", "distance": distance, "duration": 30, "metric": 160 }),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/api/workouts"))
        .await
        .unwrap();
    let view = body_json(response).await;

    assert_eq!(view["workouts"].as_array().unwrap().len(), 0);
    assert_eq!(view["markers"].as_array().unwrap().len(), 0);
    assert_eq!(view["bulk_controls_visible"], false);
    assert!(state.workouts.lock().await.is_empty());
}

#[tokio::test]
async fn test_delete_then_focus_is_not_found() {
    let (app, _state) = create_test_app();
    let id = create_workout(
        &app,
        1.0,
        1.0,
        json!({ "type": "running", "distance": 5, "duration": 30, "metric": 160 }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(empty_request("POST", &format!("/api/workouts/{}/focus", id)))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["viewport"]["center"], json!([1.0, 1.0]));
    assert_eq!(view["viewport"]["animate"], true);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/workouts/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("POST", &format!("/api/workouts/{}/focus", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_sort_by_distance_via_api() {
    let (app, _state) = create_test_app();
    for distance in [8, 3, 5] {
        create_workout(
            &app,
            1.0,
            1.0,
            json!({ "type": "running", "distance": distance, "duration": 30, "metric": 160 }),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/workouts/sort", json!({ "key": "distance" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/workouts"))
        .await
        .unwrap();
    let workouts = body_json(response).await;
    let distances: Vec<f64> = workouts
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["distance"].as_f64().unwrap())
        .collect();
    assert_eq!(distances, vec![3.0, 5.0, 8.0]);
}

#[tokio::test]
async fn test_show_all_and_type_toggle() {
    let (app, _state) = create_test_app();
    create_workout(
        &app,
        10.0,
        20.0,
        json!({ "type": "running", "distance": 5, "duration": 30, "metric": 160 }),
    )
    .await;
    create_workout(
        &app,
        12.0,
        16.0,
        json!({ "type": "running", "distance": 5, "duration": 30, "metric": 160 }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/api/map/show-all"))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["viewport"]["bounds"]["south_west"], json!([10.0, 16.0]));
    assert_eq!(view["viewport"]["bounds"]["north_east"], json!([12.0, 20.0]));

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/form/type", json!({})))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["form_type"], "cycling");

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/form/type", json!({ "type": "running" })))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["form_type"], "running");
}

#[tokio::test]
async fn test_position_error_shows_banner() {
    let (app, _state) = create_test_app();
    let response = app
        .oneshot(empty_request("POST", "/api/map/position-error"))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["banner"], "Could not get your position.");
    assert_eq!(view["map_ready"], false);
}

#[tokio::test]
async fn test_health() {
    let (app, _state) = create_test_app();
    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}
