// SPDX-License-Identifier: MIT

//! Map and form routes: map load, map clicks, type toggle, show-all.

use crate::error::Result;
use crate::models::{Coordinates, ViewSnapshot, WorkoutType};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Map and form routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/view", get(get_view))
        .route("/api/map/load", post(load_map))
        .route("/api/map/position-error", post(position_error))
        .route("/api/map/click", post(map_click))
        .route("/api/map/show-all", post(show_all))
        .route("/api/form/type", post(toggle_type))
        .route("/api/form/cancel", post(cancel_form))
}

/// A map position as sent by the map widget.
#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(value: LatLng) -> Self {
        Coordinates::new(value.lat, value.lng)
    }
}

/// Explicit type selection; `{}` toggles the current type.
#[derive(Debug, Default, Deserialize)]
struct TypeRequest {
    #[serde(rename = "type")]
    workout_type: Option<WorkoutType>,
}

/// Current view model.
async fn get_view(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    Json(state.workouts.lock().await.view())
}

/// The map finished loading at the user's position.
async fn load_map(
    State(state): State<Arc<AppState>>,
    Json(position): Json<LatLng>,
) -> Result<Json<ViewSnapshot>> {
    let mut workouts = state.workouts.lock().await;
    workouts.load_map(position.into())?;
    Ok(Json(workouts.view()))
}

/// Geolocation was denied or failed.
async fn position_error(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    let mut workouts = state.workouts.lock().await;
    workouts.position_unavailable();
    Json(workouts.view())
}

/// A click on the map opens the workout form at that spot.
async fn map_click(
    State(state): State<Arc<AppState>>,
    Json(location): Json<LatLng>,
) -> Result<Json<ViewSnapshot>> {
    let mut workouts = state.workouts.lock().await;
    workouts.begin_create(location.into())?;
    tracing::debug!(form = ?workouts.form(), "Workout form opened");
    Ok(Json(workouts.view()))
}

/// Fit the map around every workout.
async fn show_all(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    let mut workouts = state.workouts.lock().await;
    workouts.show_all();
    Json(workouts.view())
}

/// Switch between the cadence and elevation inputs.
async fn toggle_type(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TypeRequest>,
) -> Json<ViewSnapshot> {
    let mut workouts = state.workouts.lock().await;
    match req.workout_type {
        Some(workout_type) => workouts.select_type(workout_type),
        None => {
            workouts.toggle_type();
        }
    }
    Json(workouts.view())
}

/// Close the form without saving.
async fn cancel_form(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    let mut workouts = state.workouts.lock().await;
    workouts.cancel_create();
    Json(workouts.view())
}
