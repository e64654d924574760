// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

use jobhunter_api::config::Config;
use jobhunter_api::db::{CredentialStore, MemoryStore};
use jobhunter_api::routes::create_router;
use jobhunter_api::services::{HhClient, TokenCipher, TokenManager};
use jobhunter_api::AppState;
use std::sync::Arc;

/// Create a test app on the in-memory store with offline dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();

    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());

    let hh = Arc::new(HhClient::new(
        config.hh_client_id.clone(),
        config.hh_client_secret.clone(),
    ));

    let cipher = TokenCipher::new(&config.token_encryption_key).expect("test cipher");
    let tokens = TokenManager::new(hh.clone(), store, cipher);

    let state = Arc::new(AppState { config, hh, tokens });

    (create_router(state.clone()), state)
}
