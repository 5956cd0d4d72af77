// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod geocoding;
pub mod workouts;

pub use geocoding::GeocodingClient;
pub use workouts::{EditValues, SortKey, WorkoutManager};
