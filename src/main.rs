// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FitCoach API Server
//!
//! Serves the fitness assessment and training plan API on top of a hosted
//! auth service and record store.

use fitcoach::{
    backend::{AuthBackend, FirebaseAuth, MemoryAuth},
    config::{BackendMode, Config},
    db::{Database, FirestoreDb, MemoryStore},
    session::SessionRegistry,
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle browser sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, backend = ?config.backend, "Starting FitCoach API");

    let (auth, db): (Arc<dyn AuthBackend>, Database) = match config.backend {
        BackendMode::Firebase => {
            let auth = FirebaseAuth::new(config.firebase_api_key.clone())
                .expect("Failed to initialize Firebase Auth client");
            let store = FirestoreDb::new(&config.gcp_project_id)
                .await
                .expect("Failed to connect to Firestore");
            (Arc::new(auth), Database::new(Arc::new(store)))
        }
        BackendMode::Memory => {
            tracing::warn!("Using in-memory backend; all data is lost on restart");
            (
                Arc::new(MemoryAuth::new()),
                Database::new(Arc::new(MemoryStore::new())),
            )
        }
    };

    let sessions = Arc::new(SessionRegistry::new(
        auth,
        db.clone(),
        config.session_idle_timeout,
        config.max_sessions,
    ));
    sessions.spawn_sweeper(SWEEP_INTERVAL);
    tracing::info!(
        idle_timeout_secs = config.session_idle_timeout.as_secs(),
        max_sessions = config.max_sessions,
        "Session sweeper started"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        sessions,
    });

    // Build router
    let app = fitcoach::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitcoach=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
