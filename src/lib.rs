// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! JobHunter Pro: automated job search on top of HeadHunter
//!
//! This crate provides the backend API that authenticates users against
//! hh.ru (OAuth2 authorization-code flow) and calls the HeadHunter API on
//! their behalf with transparently refreshed tokens.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use services::{HhClient, TokenManager};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub hh: Arc<HhClient>,
    pub tokens: TokenManager,
}
