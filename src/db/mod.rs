//! Storage layer (local key-value file).

pub mod local;

pub use local::{LocalStore, StoredWorkouts};

/// Store keys as constants.
pub mod keys {
    /// Full workout collection, a JSON array of flat records
    pub const WORKOUTS: &str = "workouts";
}
