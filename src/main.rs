// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lesson-Tracker API Server
//!
//! Serves the progression and content-gating engine over HTTP: session
//! auth, onboarding/main flow gating, daily lesson selection and lesson
//! completion.

use lesson_tracker::{
    config::Config,
    db::{ContentStore, FirestoreDb, MemoryDb, ProfileStore, ProgressStore},
    services::catalog,
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
    tracing::info!(port = config.port, "Starting Lesson-Tracker API");

    // Pick the store backend
    let (profiles, progress, content): (
        Arc<dyn ProfileStore>,
        Arc<dyn ProgressStore>,
        Arc<dyn ContentStore>,
    ) = if config.offline {
        tracing::warn!("Running with the in-memory store (OFFLINE_MODE)");
        let db = Arc::new(MemoryDb::with_builtin_catalog());
        (db.clone(), db.clone(), db)
    } else {
        let db = Arc::new(
            FirestoreDb::new(&config.gcp_project_id)
                .await
                .expect("Failed to connect to Firestore"),
        );
        (db.clone(), db.clone(), db)
    };

    // Make sure a fresh deployment has lessons to serve
    catalog::seed_if_empty(&content)
        .await
        .expect("Failed to seed lesson catalog");

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), profiles, progress, content));

    // Build router
    let app = lesson_tracker::routes::create_router(state);

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
                .add_directive("lesson_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
