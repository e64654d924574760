// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! Contract the token lifecycle manager requires from the identity provider.
//!
//! The trait abstracts the three HeadHunter operations the manager needs so
//! tests can script provider behavior without the network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Token pair issued by the provider for either grant type.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds, relative to receipt time.
    pub expires_in: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Profile of the authenticated user as returned by `GET /me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HhProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Identity provider operations used by the token lifecycle manager.
///
/// Error contract:
/// - `exchange_code`: `ProviderRejected` on any 4xx (authorization codes
///   are single-use and must not be retried), `ProviderUnavailable` on
///   network failure or 5xx.
/// - `refresh_token`: `ReauthorizationRequired` when the provider answers
///   `invalid_grant` (the refresh token is dead), `ProviderUnavailable` on
///   timeout/network/5xx, `ProviderRejected` on any other 4xx.
/// - `fetch_profile`: `ProviderUnavailable` on network/5xx,
///   `ProviderRejected` on 4xx.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange an authorization code for a token pair.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant, AppError>;

    /// Trade a refresh token for a new token pair.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, AppError>;

    /// Fetch the authenticated user's profile.
    async fn fetch_profile(&self, access_token: &str) -> Result<HhProfile, AppError>;
}
