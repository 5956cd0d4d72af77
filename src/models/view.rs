// SPDX-License-Identifier: MIT

//! View model handed to the browser: map markers, workout list items,
//! viewport, form state and the status banner.
//!
//! The browser renders these as-is; it keeps no workout state of its own.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::workout::{Coordinates, Workout, WorkoutId, WorkoutKind, WorkoutType};
use crate::time_utils::format_utc_rfc3339;

/// Map marker with its popup for one workout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Marker {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub workout_id: WorkoutId,
    #[cfg_attr(feature = "binding-generation", ts(type = "[number, number]"))]
    pub coords: Coordinates,
    /// CSS class of the popup, e.g. "running-popup"
    pub popup_class: String,
    pub popup_content: String,
}

impl Marker {
    pub fn for_workout(workout: &Workout) -> Self {
        let workout_type = workout.workout_type();
        Self {
            workout_id: workout.id().clone(),
            coords: workout.coords(),
            popup_class: format!("{}-popup", type_slug(workout_type)),
            popup_content: format!("{} {}", workout_type.icon(), workout.title()),
        }
    }
}

/// One value row in a list item (icon, value, unit).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Detail {
    pub icon: String,
    pub value: String,
    pub unit: String,
}

impl Detail {
    fn new(icon: &str, value: String, unit: &str) -> Self {
        Self {
            icon: icon.to_string(),
            value,
            unit: unit.to_string(),
        }
    }
}

/// Rendered entry in the workout list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ListItem {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub workout_id: WorkoutId,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "binding-generation", ts(type = "\"running\" | \"cycling\""))]
    pub workout_type: WorkoutType,
    pub title: String,
    pub date: String,
    /// Distance, duration, derived metric, type-specific metric
    pub details: Vec<Detail>,
    /// True while the item shows editable inputs
    pub editing: bool,
}

impl ListItem {
    pub fn from_workout(workout: &Workout) -> Self {
        let workout_type = workout.workout_type();
        let mut details = vec![
            Detail::new(workout_type.icon(), format_number(workout.distance()), "km"),
            Detail::new("⏱", format_number(workout.duration()), "min"),
        ];

        match workout.kind() {
            WorkoutKind::Running { cadence, pace } => {
                details.push(Detail::new("⚡️", format!("{:.1}", pace), "min/km"));
                details.push(Detail::new("🦶🏼", format_number(*cadence), "spm"));
            }
            WorkoutKind::Cycling {
                elevation_gain,
                speed,
            } => {
                details.push(Detail::new("⚡️", format!("{:.1}", speed), "km/h"));
                details.push(Detail::new("⛰", format_number(*elevation_gain), "m"));
            }
        }

        Self {
            workout_id: workout.id().clone(),
            workout_type,
            title: workout.title(),
            date: format_utc_rfc3339(workout.created_at()),
            details,
            editing: false,
        }
    }
}

/// South-west and north-east corners of a map region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Bounds {
    #[cfg_attr(feature = "binding-generation", ts(type = "[number, number]"))]
    pub south_west: Coordinates,
    #[cfg_attr(feature = "binding-generation", ts(type = "[number, number]"))]
    pub north_east: Coordinates,
}

/// What the map should currently show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Viewport {
    #[cfg_attr(feature = "binding-generation", ts(type = "[number, number] | null"))]
    pub center: Option<Coordinates>,
    pub zoom: u8,
    /// Set by "show all"; the map fits these bounds instead of centering
    pub bounds: Option<Bounds>,
    pub animate: bool,
    pub pan_duration_secs: f64,
}

impl Viewport {
    pub fn new(zoom: u8) -> Self {
        Self {
            center: None,
            zoom,
            bounds: None,
            animate: false,
            pan_duration_secs: 0.0,
        }
    }
}

/// Workout form state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormState {
    /// Form hidden
    #[default]
    Idle,
    /// Map clicked, form shown and waiting for a submit
    AwaitingInput { location: Coordinates },
}

/// Complete UI snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub map_ready: bool,
    pub viewport: Viewport,
    pub form: FormState,
    /// Workout type selected in the form (decides cadence vs. elevation field)
    pub form_type: WorkoutType,
    pub banner: Option<String>,
    /// Delete-all, sort and show-all buttons
    pub bulk_controls_visible: bool,
    pub markers: Vec<Marker>,
    pub workouts: Vec<ListItem>,
}

fn type_slug(workout_type: WorkoutType) -> &'static str {
    match workout_type {
        WorkoutType::Running => "running",
        WorkoutType::Cycling => "cycling",
    }
}

/// Whole numbers print without a fractional part, as typed into the form.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
