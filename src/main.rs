// SPDX-License-Identifier: MIT

//! Mapty local server
//!
//! Serves the workout log API for the map page running in the browser.

use mapty::{config::Config, db::LocalStore, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Mapty");

    // Open the local key-value store
    let store = LocalStore::open(&config.storage_path)?;

    // Build shared state (restores saved workouts)
    let state = Arc::new(AppState::new(config.clone(), store)?);
    tracing::info!(
        workouts = state.workouts.lock().await.len(),
        geocoder = %config.geocoder_url,
        "Workout log ready"
    );

    // Build router
    let app = mapty::routes::create_router(state);

    // Start server
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mapty=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
