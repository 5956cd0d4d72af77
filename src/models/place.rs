// SPDX-License-Identifier: MIT

//! Place name resolved from coordinates by the reverse geocoder.

use serde::{Deserialize, Serialize};

/// City and country for a workout location. Either part may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub city: String,
    pub country: String,
}

impl Place {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }

    /// Non-empty name parts joined for display, e.g. "Berlin, Germany".
    pub fn label(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.trim(), self.country.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}
