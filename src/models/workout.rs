// SPDX-License-Identifier: MIT

//! Workout record model: one logged activity and its derived metric.
//!
//! Records serialize to the flat layout used by the browser's local storage
//! (`id`, `date`, `coords`, `distance`, `duration`, `type`, then `cadence`/`pace`
//! or `elevationGain`/`speed`, and an optional `description`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Place;
use crate::time_utils::format_month_day;

/// Message shown to the user when form input is rejected.
pub const INVALID_INPUTS_MESSAGE: &str = "Inputs have to be positive numbers.";

/// Number of trailing timestamp digits used for a workout id.
const ID_LENGTH: usize = 10;

/// Identifier derived from the creation time, unique within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Last ten digits of the millisecond Unix timestamp.
    pub fn from_timestamp(created_at: DateTime<Utc>) -> Self {
        let millis = created_at.timestamp_millis().to_string();
        let start = millis.len().saturating_sub(ID_LENGTH);
        Self(millis[start..].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkoutId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latitude/longitude pair, stored as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both parts are finite numbers.
    ///
    /// Ranges are not checked: a map panned across the antimeridian reports
    /// longitudes past 180 and those are stored as clicked.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coords: Coordinates) -> Self {
        [coords.lat, coords.lng]
    }
}

/// Workout type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    #[default]
    Running,
    Cycling,
}

impl WorkoutType {
    /// Capitalized name used in descriptions.
    pub fn label(self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WorkoutType::Running => "🏃‍♂️",
            WorkoutType::Cycling => "🚴‍♀️",
        }
    }

    /// Field name of the type-specific metric.
    pub fn metric_name(self) -> &'static str {
        match self {
            WorkoutType::Running => "cadence",
            WorkoutType::Cycling => "elevationGain",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            WorkoutType::Running => WorkoutType::Cycling,
            WorkoutType::Cycling => WorkoutType::Running,
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Type-specific payload. The derived metric is never set directly; it is
/// recomputed from distance and duration by [`Workout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutKind {
    Running {
        /// Steps per minute
        cadence: f64,
        /// Minutes per kilometer
        #[serde(default)]
        pace: f64,
    },
    Cycling {
        /// Meters climbed
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        /// Kilometers per hour
        #[serde(default)]
        speed: f64,
    },
}

impl WorkoutKind {
    fn new(workout_type: WorkoutType, metric: f64) -> Self {
        match workout_type {
            WorkoutType::Running => WorkoutKind::Running {
                cadence: metric,
                pace: 0.0,
            },
            WorkoutType::Cycling => WorkoutKind::Cycling {
                elevation_gain: metric,
                speed: 0.0,
            },
        }
    }

    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }

    /// Cadence for running, elevation gain for cycling.
    pub fn metric(&self) -> f64 {
        match self {
            WorkoutKind::Running { cadence, .. } => *cadence,
            WorkoutKind::Cycling { elevation_gain, .. } => *elevation_gain,
        }
    }
}

/// Raw numbers from the workout form (create) or an edited list item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutInput {
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    /// Kilometers
    pub distance: f64,
    /// Minutes
    pub duration: f64,
    /// Cadence (running) or elevation gain (cycling)
    pub metric: f64,
}

impl WorkoutInput {
    pub fn new(workout_type: WorkoutType, distance: f64, duration: f64, metric: f64) -> Self {
        Self {
            workout_type,
            distance,
            duration,
            metric,
        }
    }

    /// All values must be finite; distance and duration must be positive.
    /// Cadence must be positive too, but elevation gain may be zero or
    /// negative (a downhill ride).
    pub fn validate(&self) -> Result<(), ValidationError> {
        let metric_name = self.workout_type.metric_name();

        for (field, value) in [
            ("distance", self.distance),
            ("duration", self.duration),
            (metric_name, self.metric),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field });
            }
        }

        for (field, value) in [("distance", self.distance), ("duration", self.duration)] {
            if value <= 0.0 {
                return Err(ValidationError::NotPositive { field });
            }
        }

        if self.workout_type == WorkoutType::Running && self.metric <= 0.0 {
            return Err(ValidationError::NotPositive { field: metric_name });
        }

        Ok(())
    }
}

/// Rejected workout values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be positive")]
    NotPositive { field: &'static str },

    #[error("workout type cannot change from {from} to {to}")]
    TypeChange { from: WorkoutType, to: WorkoutType },

    #[error("coordinates must be finite numbers")]
    Coordinates,
}

/// One logged workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: WorkoutId,
    #[serde(rename = "date")]
    created_at: DateTime<Utc>,
    coords: Coordinates,
    distance: f64,
    duration: f64,
    #[serde(flatten)]
    kind: WorkoutKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Workout {
    /// Build a validated record with its derived metric computed.
    ///
    /// The description stays pending until [`Workout::resolve_description`]
    /// is called with the geocoding result.
    pub fn new(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coordinates,
        input: WorkoutInput,
    ) -> Result<Self, ValidationError> {
        input.validate()?;
        if !coords.is_valid() {
            return Err(ValidationError::Coordinates);
        }

        let mut workout = Self {
            id,
            created_at,
            coords,
            distance: input.distance,
            duration: input.duration,
            kind: WorkoutKind::new(input.workout_type, input.metric),
            description: None,
        };
        workout.recompute_derived();
        Ok(workout)
    }

    /// Apply edited values. Identity, location, creation time and
    /// description are unchanged; the derived metric is recomputed.
    pub fn update(&mut self, input: WorkoutInput) -> Result<(), ValidationError> {
        let current = self.workout_type();
        if input.workout_type != current {
            return Err(ValidationError::TypeChange {
                from: current,
                to: input.workout_type,
            });
        }
        input.validate()?;

        self.distance = input.distance;
        self.duration = input.duration;
        self.kind = WorkoutKind::new(input.workout_type, input.metric);
        self.recompute_derived();
        Ok(())
    }

    /// Restore a deserialized record to a fully typed one: re-validate the
    /// stored values and recompute the derived metric.
    pub fn rehydrate(mut self) -> Result<Self, ValidationError> {
        self.input().validate()?;
        if !self.coords.is_valid() {
            return Err(ValidationError::Coordinates);
        }
        self.recompute_derived();
        Ok(self)
    }

    fn recompute_derived(&mut self) {
        let (distance, duration) = (self.distance, self.duration);
        match &mut self.kind {
            WorkoutKind::Running { pace, .. } => *pace = duration / distance,
            WorkoutKind::Cycling { speed, .. } => *speed = distance / (duration / 60.0),
        }
    }

    /// Set the description from the geocoding result (or its absence).
    pub fn resolve_description(&mut self, place: Option<&Place>) {
        self.description = Some(describe(self.workout_type(), self.created_at, place));
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coords(&self) -> Coordinates {
        self.coords
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    /// Resolved description, `None` while the place lookup is pending.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Description if resolved, otherwise the label without a place name.
    pub fn title(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| describe(self.workout_type(), self.created_at, None))
    }

    /// Minutes per kilometer (running only).
    pub fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { pace, .. } => Some(pace),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    /// Kilometers per hour (cycling only).
    pub fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { speed, .. } => Some(speed),
            WorkoutKind::Running { .. } => None,
        }
    }

    /// Current values as form input.
    pub fn input(&self) -> WorkoutInput {
        WorkoutInput::new(
            self.workout_type(),
            self.distance,
            self.duration,
            self.kind.metric(),
        )
    }
}

/// Human-readable label, e.g. "Running on April 14 in Berlin, Germany".
pub fn describe(workout_type: WorkoutType, date: DateTime<Utc>, place: Option<&Place>) -> String {
    let mut label = format!("{} on {}", workout_type.label(), format_month_day(date));
    if let Some(name) = place.and_then(Place::label) {
        label.push_str(" in ");
        label.push_str(&name);
    }
    label
}
