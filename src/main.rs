// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! JobHunter Pro API Server
//!
//! Backend for the JobHunter Pro web client: HeadHunter OAuth, token
//! lifecycle management, and job-board API access on the user's behalf.

use jobhunter_api::{
    config::Config,
    db::{CredentialStore, FirestoreStore, MemoryStore},
    services::{HhClient, TokenCipher, TokenManager},
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
    tracing::info!(port = config.port, "Starting JobHunter Pro API");

    // Initialize the credential store
    let store: Arc<dyn CredentialStore> = match &config.gcp_project_id {
        Some(project_id) => Arc::new(
            FirestoreStore::new(project_id)
                .await
                .expect("Failed to connect to Firestore"),
        ),
        None => {
            tracing::warn!("GCP_PROJECT_ID not set, using in-memory credential store");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize the HeadHunter client
    let hh = Arc::new(HhClient::new(
        config.hh_client_id.clone(),
        config.hh_client_secret.clone(),
    ));

    // Initialize the token lifecycle manager
    let cipher = TokenCipher::new(&config.token_encryption_key)
        .expect("Invalid TOKEN_ENCRYPTION_KEY");
    let tokens = TokenManager::new(hh.clone(), store, cipher);
    tracing::info!("Token manager initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        hh,
        tokens,
    });

    // Build router
    let app = jobhunter_api::routes::create_router(state);

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
                .add_directive("jobhunter_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
