//! Application configuration loaded from environment variables.
//!
//! Everything has a sensible local default, so a bare `cargo run` starts a
//! working tracker on localhost with its data under `data/`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface the server binds to
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// File backing the local key-value store
    pub storage_path: PathBuf,
    /// Base URL of the Nominatim-compatible reverse geocoder
    pub geocoder_url: String,
    /// User-Agent sent to the geocoder (Nominatim rejects anonymous clients)
    pub geocoder_user_agent: String,
    /// Upper bound on a single reverse-geocoding request
    pub geocoder_timeout: Duration,
    /// Zoom level used when centering the map
    pub map_zoom_level: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            storage_path: PathBuf::from("data/workouts.json"),
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            geocoder_user_agent: format!("mapty/{}", env!("CARGO_PKG_VERSION")),
            geocoder_timeout: Duration::from_secs(5),
            map_zoom_level: 13,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to [`Config::default`]; set but unparseable
    /// numeric variables are an error rather than being silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            storage_path: env::var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            geocoder_url: env::var("GEOCODER_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.geocoder_url),
            geocoder_user_agent: env::var("GEOCODER_USER_AGENT")
                .unwrap_or(defaults.geocoder_user_agent),
            geocoder_timeout: parse_var::<u64>("GEOCODER_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.geocoder_timeout),
            map_zoom_level: parse_var("MAP_ZOOM_LEVEL")?.unwrap_or(defaults.map_zoom_level),
        })
    }

    /// Config for tests: in-process only, geocoder pointed at a closed port.
    pub fn test_default() -> Self {
        Self {
            port: 0,
            storage_path: PathBuf::from("target/test-workouts.json"),
            geocoder_url: "http://127.0.0.1:9".to_string(),
            geocoder_timeout: Duration::from_secs(1),
            ..Self::default()
        }
    }

    /// Socket address string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
