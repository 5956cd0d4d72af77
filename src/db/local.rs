// SPDX-License-Identifier: MIT

//! Local key-value store, the on-disk stand-in for browser `localStorage`.
//!
//! Values are strings, as in the browser. The whole map lives in one JSON
//! file (`{ "key": "value", ... }`) that is rewritten through a temp file and
//! a rename on every change, so a crash never leaves a half-written file.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::keys;
use crate::error::AppError;
use crate::models::Workout;

/// Workouts read back from the store.
#[derive(Debug)]
pub struct StoredWorkouts {
    pub workouts: Vec<Workout>,
    /// Records that could not be restored
    pub skipped: usize,
}

/// String key-value store backed by a JSON file or kept in memory.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    /// Open (or create) a file-backed store.
    ///
    /// An unreadable or corrupt file is logged and treated as empty; it is
    /// replaced on the next write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let entries: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt store file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::info!(path = %path.display(), keys = entries.len(), "Opened local store");
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    /// Create a store that never touches the filesystem (tests).
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a value. If the file cannot be written the previous value is
    /// kept, so memory and disk stay in step.
    pub fn set_item(&mut self, key: &str, value: String) -> Result<(), AppError> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Remove a value. A failed write leaves it in place.
    pub fn remove_item(&mut self, key: &str) -> Result<(), AppError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush() {
            self.entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let body = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| AppError::Storage(format!("Failed to encode store: {}", e)))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, body)
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, path).map_err(|e| {
            AppError::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    // ─── Workout Operations ──────────────────────────────────────

    /// Serialize the full collection, in its current order.
    pub fn save_workouts(&mut self, workouts: &[Workout]) -> Result<(), AppError> {
        let value = serde_json::to_string(workouts)
            .map_err(|e| AppError::Storage(format!("Failed to encode workouts: {}", e)))?;
        self.set_item(keys::WORKOUTS, value)?;
        tracing::debug!(count = workouts.len(), "Saved workouts");
        Ok(())
    }

    /// Load and rehydrate the persisted collection.
    ///
    /// Returns `Ok(None)` when nothing was saved and `AppError::Storage` when
    /// the entry is not a JSON array. See [`read_workouts`](Self::read_workouts)
    /// for how bad records are handled.
    pub fn load_workouts(&self) -> Result<Option<Vec<Workout>>, AppError> {
        Ok(self.read_workouts()?.map(|stored| stored.workouts))
    }

    /// Like [`load_workouts`](Self::load_workouts), also counting skipped
    /// records. Records that fail to parse or validate, and repeated ids,
    /// are skipped with a warning.
    pub fn read_workouts(&self) -> Result<Option<StoredWorkouts>, AppError> {
        let Some(raw) = self.get_item(keys::WORKOUTS) else {
            return Ok(None);
        };

        let records: Vec<serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| AppError::Storage(format!("Corrupt workout data: {}", e)))?;

        let mut seen = HashSet::new();
        let mut workouts = Vec::with_capacity(records.len());
        let mut skipped = 0;

        for (index, record) in records.into_iter().enumerate() {
            let workout = serde_json::from_value::<Workout>(record)
                .map_err(|e| e.to_string())
                .and_then(|w| w.rehydrate().map_err(|e| e.to_string()));

            match workout {
                Ok(workout) if seen.insert(workout.id().clone()) => workouts.push(workout),
                Ok(workout) => {
                    skipped += 1;
                    tracing::warn!(index, id = %workout.id(), "Skipping duplicate workout id");
                }
                Err(error) => {
                    skipped += 1;
                    tracing::warn!(index, error = %error, "Skipping unreadable workout");
                }
            }
        }

        Ok(Some(StoredWorkouts { workouts, skipped }))
    }

    pub fn clear_workouts(&mut self) -> Result<(), AppError> {
        self.remove_item(keys::WORKOUTS)
    }
}
