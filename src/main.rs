// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SafeCity Index API Server
//!
//! Serves city safety scores for the dashboard, reconciling the hosted
//! table store with the embedded dataset, and relays incident reports.

use safecity_index::{
    config::Config,
    db::{CitySource, RemoteDb, StaticDataset},
    services::spawn_feed_listeners,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting SafeCity Index API");

    let fallback = StaticDataset::embedded().expect("Failed to load embedded city dataset");
    tracing::info!(count = fallback.len(), "Embedded city dataset loaded");

    let remote = Arc::new(RemoteDb::from_config(&config).expect("Failed to build remote client"));
    let source: Arc<dyn CitySource> = if config.is_remote_configured() {
        remote.clone()
    } else {
        Arc::new(fallback.clone())
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), source, remote, fallback));

    // Initial load; falls back to local data on any failure
    let active = state.cities.load().await;
    tracing::info!(source = active.as_str(), "City data loaded");
    state.reports.refresh().await;

    let _listeners = spawn_feed_listeners(
        &state.feed,
        state.cities.clone(),
        state.reports.clone(),
    );

    // Build router
    let app = safecity_index::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
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

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("safecity_index=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
