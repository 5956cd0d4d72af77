// SPDX-License-Identifier: MIT

//! Workout routes: submit, edit, delete, sort, focus, reset.

use crate::error::Result;
use crate::models::{Coordinates, ViewSnapshot, Workout, WorkoutId, WorkoutInput};
use crate::services::{EditValues, SortKey};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Workout routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/workouts",
            get(list_workouts).post(submit_workout).delete(delete_all),
        )
        .route("/api/workouts/sort", post(sort_workouts))
        .route(
            "/api/workouts/{id}",
            put(save_edit).delete(delete_workout),
        )
        .route("/api/workouts/{id}/edit", post(begin_edit))
        .route("/api/workouts/{id}/focus", post(focus_workout))
        .route("/api/reset", post(reset))
}

#[derive(Debug, Deserialize)]
struct SortRequest {
    key: SortKey,
}

/// All workouts in collection order, as stored.
async fn list_workouts(State(state): State<Arc<AppState>>) -> Json<Vec<Workout>> {
    Json(state.workouts.lock().await.workouts().to_vec())
}

/// Submit the workout form.
///
/// The workout is listed right away with a label lacking the place name;
/// the reverse-geocoding lookup runs in the background and patches it in.
async fn submit_workout(
    State(state): State<Arc<AppState>>,
    Json(input): Json<WorkoutInput>,
) -> Result<(StatusCode, Json<ViewSnapshot>)> {
    let mut workouts = state.workouts.lock().await;
    let workout = workouts.commit_create(input)?;
    let view = workouts.view();
    drop(workouts);

    spawn_place_lookup(state, workout.id().clone(), workout.coords());
    Ok((StatusCode::CREATED, Json(view)))
}

/// Resolve the place name off the request path.
///
/// If the workout is deleted before the lookup settles, applying the result
/// is a no-op.
fn spawn_place_lookup(state: Arc<AppState>, id: WorkoutId, coords: Coordinates) {
    tokio::spawn(async move {
        let place = state.geocoder.reverse(coords).await;
        state.workouts.lock().await.apply_place(&id, place);
    });
}

/// Put a list item into edit mode.
async fn begin_edit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ViewSnapshot>> {
    let mut workouts = state.workouts.lock().await;
    workouts.begin_edit(&WorkoutId::from(id))?;
    Ok(Json(workouts.view()))
}

/// Save an edited list item.
async fn save_edit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(values): Json<EditValues>,
) -> Result<Json<ViewSnapshot>> {
    let mut workouts = state.workouts.lock().await;
    workouts.edit(&WorkoutId::from(id), values)?;
    Ok(Json(workouts.view()))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ViewSnapshot>> {
    let mut workouts = state.workouts.lock().await;
    workouts.delete(&WorkoutId::from(id))?;
    Ok(Json(workouts.view()))
}

async fn delete_all(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    let mut workouts = state.workouts.lock().await;
    workouts.delete_all();
    Json(workouts.view())
}

async fn sort_workouts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SortRequest>,
) -> Json<ViewSnapshot> {
    let mut workouts = state.workouts.lock().await;
    workouts.sort_by(req.key);
    Json(workouts.view())
}

/// Pan the map to a workout (list item click).
async fn focus_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ViewSnapshot>> {
    let mut workouts = state.workouts.lock().await;
    workouts.focus_on(&WorkoutId::from(id))?;
    Ok(Json(workouts.view()))
}

/// Drop all workouts, including the stored copy.
async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<ViewSnapshot>> {
    let mut workouts = state.workouts.lock().await;
    workouts.reset()?;
    Ok(Json(workouts.view()))
}
