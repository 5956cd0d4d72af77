// SPDX-License-Identifier: MIT

//! Mapty: log workouts on a map
//!
//! This crate provides the local backend for a map-based workout log. The
//! browser reports map clicks and form input; the backend validates them,
//! keeps the workout collection with its markers and list items, resolves
//! place names, and persists everything to a local key-value file.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::LocalStore;
use error::AppError;
use services::{GeocodingClient, WorkoutManager};
use tokio::sync::Mutex;

/// Shared application state, passed to every handler.
pub struct AppState {
    pub config: Config,
    pub workouts: Mutex<WorkoutManager>,
    pub geocoder: GeocodingClient,
}

impl AppState {
    /// Build the state around an opened store and restore saved workouts.
    pub fn new(config: Config, store: LocalStore) -> Result<Self, AppError> {
        let geocoder = GeocodingClient::from_config(&config)?;

        let mut workouts = WorkoutManager::new(store, config.map_zoom_level);
        workouts.restore_from_storage();

        Ok(Self {
            config,
            workouts: Mutex::new(workouts),
            geocoder,
        })
    }
}
