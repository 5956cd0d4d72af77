// SPDX-License-Identifier: MIT

//! Workout collection manager.
//!
//! Owns the authoritative, ordered list of workouts and keeps the two views
//! derived from it in step:
//! - map markers, keyed by workout id (present once the map is loaded)
//! - list items, keyed by workout id and ordered by the collection
//!
//! Every mutating operation writes the full collection through to the local
//! store. Storage failures are logged and never undo the in-memory change.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use geo::{BoundingRect, MultiPoint, Point};
use serde::Deserialize;

use crate::db::LocalStore;
use crate::error::{AppError, Result};
use crate::models::workout::INVALID_INPUTS_MESSAGE;
use crate::models::{
    Bounds, Coordinates, FormState, ListItem, Marker, Place, ViewSnapshot, Viewport, Workout,
    WorkoutId, WorkoutInput, WorkoutType,
};

/// Banner shown when the browser cannot provide a position.
pub const POSITION_UNAVAILABLE_MESSAGE: &str = "Could not get your position.";
/// Banner shown while a list item is being edited.
pub const SAVE_TO_CONTINUE_MESSAGE: &str = "Save to continue.";

/// Pan animation length when focusing a workout.
const FOCUS_PAN_SECS: f64 = 1.0;

/// Sort order for the workout list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Creation time, oldest first
    Date,
    /// Distance, shortest first
    Distance,
}

/// New numbers for an existing workout (its type is fixed).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EditValues {
    pub distance: f64,
    pub duration: f64,
    pub metric: f64,
}

/// Collection of workouts plus the UI state that hangs off it.
pub struct WorkoutManager {
    store: LocalStore,
    zoom_level: u8,
    workouts: Vec<Workout>,
    markers: HashMap<WorkoutId, Marker>,
    list_items: HashMap<WorkoutId, ListItem>,
    form: FormState,
    form_type: WorkoutType,
    viewport: Viewport,
    map_ready: bool,
    banner: Option<String>,
    bulk_controls_visible: bool,
}

impl WorkoutManager {
    pub fn new(store: LocalStore, zoom_level: u8) -> Self {
        Self {
            store,
            zoom_level,
            workouts: Vec::new(),
            markers: HashMap::new(),
            list_items: HashMap::new(),
            form: FormState::Idle,
            form_type: WorkoutType::default(),
            viewport: Viewport::new(zoom_level),
            map_ready: false,
            banner: None,
            bulk_controls_visible: false,
        }
    }

    // ─── Startup ─────────────────────────────────────────────────

    /// Load persisted workouts and render them as list items.
    ///
    /// Markers are added by [`load_map`](Self::load_map) once the map exists.
    /// Absent or corrupt storage leaves the collection empty.
    pub fn restore_from_storage(&mut self) -> usize {
        let workouts = match self.store.read_workouts() {
            Ok(Some(stored)) => {
                if stored.skipped > 0 {
                    tracing::warn!(
                        skipped = stored.skipped,
                        kept = stored.workouts.len(),
                        "Unreadable saved workouts will be dropped on the next save"
                    );
                }
                stored.workouts
            }
            Ok(None) => {
                tracing::info!("No saved workouts");
                return 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable saved workouts");
                return 0;
            }
        };

        self.workouts = workouts;
        self.markers.clear();
        self.rerender_list();
        if self.map_ready {
            self.render_missing_markers();
        }
        self.bulk_controls_visible = !self.workouts.is_empty();

        tracing::info!(count = self.workouts.len(), "Restored workouts");
        self.workouts.len()
    }

    /// The map is up, centered on the user's position.
    pub fn load_map(&mut self, position: Coordinates) -> Result<()> {
        if !position.is_valid() {
            return Err(AppError::BadRequest("Position must be finite".to_string()));
        }

        self.map_ready = true;
        self.viewport = Viewport {
            center: Some(position),
            ..Viewport::new(self.zoom_level)
        };
        if self.banner.as_deref() == Some(POSITION_UNAVAILABLE_MESSAGE) {
            self.banner = None;
        }
        self.render_missing_markers();

        tracing::info!(markers = self.markers.len(), "Map loaded");
        Ok(())
    }

    /// The browser refused or failed to report a position.
    pub fn position_unavailable(&mut self) {
        tracing::warn!("User position unavailable");
        self.banner = Some(POSITION_UNAVAILABLE_MESSAGE.to_string());
    }

    // ─── Create ──────────────────────────────────────────────────

    /// Remember the clicked map location and show the form.
    pub fn begin_create(&mut self, location: Coordinates) -> Result<()> {
        if !location.is_valid() {
            return Err(AppError::BadRequest("Location must be finite".to_string()));
        }
        self.form = FormState::AwaitingInput { location };
        Ok(())
    }

    /// Switch between the cadence (running) and elevation (cycling) field.
    pub fn toggle_type(&mut self) -> WorkoutType {
        self.form_type = self.form_type.toggled();
        self.form_type
    }

    pub fn select_type(&mut self, workout_type: WorkoutType) {
        self.form_type = workout_type;
    }

    /// Hide the form without creating anything.
    pub fn cancel_create(&mut self) {
        self.form = FormState::Idle;
    }

    /// Validate the form and append a workout at the pending location.
    pub fn commit_create(&mut self, input: WorkoutInput) -> Result<Workout> {
        self.commit_create_at(input, Utc::now())
    }

    /// [`commit_create`](Self::commit_create) with an explicit creation time.
    pub fn commit_create_at(&mut self, input: WorkoutInput, now: DateTime<Utc>) -> Result<Workout> {
        let FormState::AwaitingInput { location } = self.form else {
            return Err(AppError::BadRequest("No map location selected".to_string()));
        };

        if let Err(e) = input.validate() {
            tracing::info!(error = %e, "Rejected workout input");
            self.banner = Some(INVALID_INPUTS_MESSAGE.to_string());
            return Err(e.into());
        }

        let id = self.next_id(now);
        let workout = Workout::new(id.clone(), now, location, input)?;

        if self.map_ready {
            self.markers.insert(id.clone(), Marker::for_workout(&workout));
        }
        self.list_items
            .insert(id.clone(), ListItem::from_workout(&workout));
        self.workouts.push(workout.clone());

        self.banner = None;
        self.bulk_controls_visible = true;
        self.form = FormState::Idle;
        self.form_type = input.workout_type;
        self.persist();

        tracing::info!(
            id = %id,
            workout_type = %input.workout_type,
            distance = input.distance,
            duration = input.duration,
            "Workout created"
        );
        Ok(workout)
    }

    /// First id derived from `now` that is not already taken.
    fn next_id(&self, now: DateTime<Utc>) -> WorkoutId {
        let mut stamp = now;
        loop {
            let id = WorkoutId::from_timestamp(stamp);
            if !self.contains(&id) {
                return id;
            }
            stamp += Duration::milliseconds(1);
        }
    }

    /// Fill in the description once the place lookup settles.
    ///
    /// Returns `false` (and changes nothing) if the workout was deleted in
    /// the meantime.
    pub fn apply_place(&mut self, id: &WorkoutId, place: Option<Place>) -> bool {
        let Some(workout) = self.workouts.iter_mut().find(|w| w.id() == id) else {
            tracing::debug!(id = %id, "Place resolved for a workout that no longer exists");
            return false;
        };

        workout.resolve_description(place.as_ref());
        let title = workout.title();

        if let Some(marker) = self.markers.get_mut(id) {
            *marker = Marker::for_workout(workout);
        }
        if let Some(item) = self.list_items.get_mut(id) {
            item.title = title;
        }

        self.persist();
        true
    }

    // ─── Edit ────────────────────────────────────────────────────

    /// Switch a list item to editable inputs.
    pub fn begin_edit(&mut self, id: &WorkoutId) -> Result<()> {
        let Some(item) = self.list_items.get_mut(id) else {
            return Err(not_found(id, "edit"));
        };
        item.editing = true;
        self.banner = Some(SAVE_TO_CONTINUE_MESSAGE.to_string());
        Ok(())
    }

    /// Save edited values: mutate in place and recompute the derived metric.
    ///
    /// Invalid values leave the workout untouched and the item in edit mode.
    pub fn edit(&mut self, id: &WorkoutId, values: EditValues) -> Result<Workout> {
        let Some(workout) = self.workouts.iter_mut().find(|w| w.id() == id) else {
            return Err(not_found(id, "edit"));
        };

        let input = WorkoutInput::new(
            workout.workout_type(),
            values.distance,
            values.duration,
            values.metric,
        );
        if let Err(e) = workout.update(input) {
            tracing::info!(id = %id, error = %e, "Rejected workout edit");
            self.banner = Some(INVALID_INPUTS_MESSAGE.to_string());
            return Err(e.into());
        }

        let updated = workout.clone();
        self.list_items
            .insert(id.clone(), ListItem::from_workout(&updated));
        self.banner = None;
        self.persist();

        tracing::info!(id = %id, distance = values.distance, duration = values.duration, "Workout edited");
        Ok(updated)
    }

    // ─── Delete ──────────────────────────────────────────────────

    /// Remove a workout together with its marker and list item.
    pub fn delete(&mut self, id: &WorkoutId) -> Result<Workout> {
        let Some(index) = self.workouts.iter().position(|w| w.id() == id) else {
            return Err(not_found(id, "delete"));
        };

        let removed = self.workouts.remove(index);
        self.markers.remove(id);
        self.list_items.remove(id);

        if self.workouts.is_empty() {
            self.bulk_controls_visible = false;
        }
        self.persist();

        tracing::info!(id = %id, remaining = self.workouts.len(), "Workout deleted");
        Ok(removed)
    }

    /// Remove every workout, marker and list item. Returns how many went.
    pub fn delete_all(&mut self) -> usize {
        let count = self.workouts.len();

        self.workouts.clear();
        self.markers.clear();
        self.list_items.clear();
        self.bulk_controls_visible = false;
        self.persist();

        tracing::info!(count, "All workouts deleted");
        count
    }

    /// Forget everything, including the stored collection.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear_workouts()?;

        self.workouts.clear();
        self.markers.clear();
        self.list_items.clear();
        self.form = FormState::Idle;
        self.form_type = WorkoutType::default();
        self.banner = None;
        self.bulk_controls_visible = false;

        tracing::info!("Workout tracker reset");
        Ok(())
    }

    // ─── Order & Navigation ──────────────────────────────────────

    /// Stable ascending sort of the collection itself; the list is rebuilt,
    /// markers are keyed by id and stay as they are.
    pub fn sort_by(&mut self, key: SortKey) {
        match key {
            SortKey::Date => self.workouts.sort_by_key(|w| w.created_at()),
            SortKey::Distance => self
                .workouts
                .sort_by(|a, b| a.distance().total_cmp(&b.distance())),
        }

        self.rerender_list();
        self.persist();
        tracing::debug!(?key, count = self.workouts.len(), "Workouts sorted");
    }

    /// Smoothly pan the map to a workout.
    pub fn focus_on(&mut self, id: &WorkoutId) -> Result<Coordinates> {
        let Some(coords) = self.get(id).map(Workout::coords) else {
            return Err(not_found(id, "focus"));
        };

        self.viewport = Viewport {
            center: Some(coords),
            animate: true,
            pan_duration_secs: FOCUS_PAN_SECS,
            ..Viewport::new(self.zoom_level)
        };
        Ok(coords)
    }

    /// Fit the map to all workouts. Needs at least two of them.
    pub fn show_all(&mut self) -> Option<Bounds> {
        if self.workouts.len() < 2 {
            return None;
        }

        let points: Vec<Point<f64>> = self
            .workouts
            .iter()
            .map(|w| Point::new(w.coords().lng, w.coords().lat))
            .collect();
        let rect = MultiPoint::from(points).bounding_rect()?;

        let bounds = Bounds {
            south_west: Coordinates::new(rect.min().y, rect.min().x),
            north_east: Coordinates::new(rect.max().y, rect.max().x),
        };
        let center = rect.center();

        self.viewport = Viewport {
            center: Some(Coordinates::new(center.y, center.x)),
            bounds: Some(bounds),
            animate: true,
            ..Viewport::new(self.zoom_level)
        };
        Some(bounds)
    }

    // ─── Accessors ───────────────────────────────────────────────

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn get(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn contains(&self, id: &WorkoutId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn marker(&self, id: &WorkoutId) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// List items in collection order.
    pub fn list_items(&self) -> Vec<&ListItem> {
        self.workouts
            .iter()
            .filter_map(|w| self.list_items.get(w.id()))
            .collect()
    }

    pub fn form(&self) -> FormState {
        self.form
    }

    pub fn form_type(&self) -> WorkoutType {
        self.form_type
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn bulk_controls_visible(&self) -> bool {
        self.bulk_controls_visible
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn map_ready(&self) -> bool {
        self.map_ready
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Every workout has exactly one list item and, once the map is loaded,
    /// exactly one marker; nothing exists for a workout that is gone.
    pub fn is_consistent(&self) -> bool {
        let markers_ok = if self.map_ready {
            self.covers(&self.markers)
        } else {
            self.markers.is_empty()
        };
        self.covers(&self.list_items) && markers_ok
    }

    fn covers<V>(&self, views: &HashMap<WorkoutId, V>) -> bool {
        views.len() == self.workouts.len()
            && self.workouts.iter().all(|w| views.contains_key(w.id()))
    }

    /// Snapshot for the browser.
    pub fn view(&self) -> ViewSnapshot {
        ViewSnapshot {
            map_ready: self.map_ready,
            viewport: self.viewport.clone(),
            form: self.form,
            form_type: self.form_type,
            banner: self.banner.clone(),
            bulk_controls_visible: self.bulk_controls_visible,
            markers: self
                .workouts
                .iter()
                .filter_map(|w| self.markers.get(w.id()).cloned())
                .collect(),
            workouts: self.list_items().into_iter().cloned().collect(),
        }
    }

    // ─── Internals ───────────────────────────────────────────────

    fn rerender_list(&mut self) {
        self.list_items = self
            .workouts
            .iter()
            .map(|w| (w.id().clone(), ListItem::from_workout(w)))
            .collect();
    }

    fn render_missing_markers(&mut self) {
        for workout in &self.workouts {
            self.markers
                .entry(workout.id().clone())
                .or_insert_with(|| Marker::for_workout(workout));
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save_workouts(&self.workouts) {
            tracing::error!(error = %e, count = self.workouts.len(), "Failed to persist workouts");
        }
    }
}

fn not_found(id: &WorkoutId, action: &str) -> AppError {
    tracing::warn!(id = %id, action, "Unknown workout id");
    AppError::NotFound(format!("Workout {} not found", id))
}
