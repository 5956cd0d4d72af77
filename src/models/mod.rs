// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod place;
pub mod view;
pub mod workout;

pub use place::Place;
pub use view::{Bounds, FormState, ListItem, Marker, ViewSnapshot, Viewport};
pub use workout::{Coordinates, Workout, WorkoutId, WorkoutInput, WorkoutKind, WorkoutType};
