// SPDX-License-Identifier: MIT

//! Reverse geocoding client (Nominatim API) for workout place names.
//!
//! A lookup failure is never fatal: callers use [`GeocodingClient::reverse`],
//! which logs the error and yields `None`, and the workout keeps a label
//! without a place name.

use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Coordinates, Place};

/// Nominatim reverse-geocoding client.
#[derive(Clone)]
pub struct GeocodingClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeocodingClient {
    /// Create a client. Every request is bounded by `timeout`.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            &config.geocoder_url,
            &config.geocoder_user_agent,
            config.geocoder_timeout,
        )
    }

    /// Look up the city and country for a coordinate pair.
    pub async fn lookup(&self, coords: Coordinates) -> Result<Place, AppError> {
        let url = format!("{}/reverse", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coords.lat.to_string()),
                ("lon", coords.lng.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Geocoding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Geocoding(format!("HTTP {}: {}", status, body)));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| AppError::Geocoding(format!("JSON parse error: {}", e)))?;

        body.address
            .map(Address::into_place)
            .ok_or_else(|| AppError::Geocoding("Response has no address".to_string()))
    }

    /// Like [`lookup`](Self::lookup), but logs failures and returns `None`.
    pub async fn reverse(&self, coords: Coordinates) -> Option<Place> {
        match self.lookup(coords).await {
            Ok(place) => {
                tracing::debug!(lat = coords.lat, lng = coords.lng, city = %place.city, "Resolved place");
                Some(place)
            }
            Err(e) => {
                tracing::warn!(lat = coords.lat, lng = coords.lng, error = %e, "Reverse geocoding failed");
                None
            }
        }
    }
}

/// Reverse geocoding response (only the fields we read).
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    street: Option<String>,
    road: Option<String>,
    country: Option<String>,
}

impl Address {
    /// City falls back through town, village and street names.
    fn into_place(self) -> Place {
        let city = [self.city, self.town, self.village, self.street, self.road]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .unwrap_or_default();

        Place {
            city,
            country: self.country.unwrap_or_default(),
        }
    }
}
