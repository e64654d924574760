//! Application configuration loaded from environment variables.
//!
//! Secrets are read once at startup and cached in memory.

use std::env;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// HeadHunter OAuth client ID (public)
    pub hh_client_id: String,
    /// Redirect URI registered with the HeadHunter application.
    /// Must match the registered value byte-for-byte.
    pub hh_redirect_uri: String,
    /// Frontend URL for OAuth redirects
    pub frontend_url: String,
    /// GCP project ID for the Firestore credential store.
    /// When unset the server runs on the in-memory store.
    pub gcp_project_id: Option<String>,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// HeadHunter OAuth client secret
    pub hh_client_secret: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for signing the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,
    /// AES-256 key for encrypting stored tokens (32 bytes)
    pub token_encryption_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file first if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            hh_client_id: env::var("HH_CLIENT_ID").map_err(|_| ConfigError::Missing("HH_CLIENT_ID"))?,
            hh_redirect_uri: env::var("HH_REDIRECT_URI")
                .unwrap_or_else(|_| "https://jhunterpro.ru/api/auth/callback".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "https://jhunterpro.ru".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").ok(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8001".to_string())
                .parse()
                .unwrap_or(8001),

            hh_client_secret: env::var("HH_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("HH_CLIENT_SECRET"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
            token_encryption_key: decode_encryption_key(
                &env::var("TOKEN_ENCRYPTION_KEY")
                    .map_err(|_| ConfigError::Missing("TOKEN_ENCRYPTION_KEY"))?,
            )?,
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            hh_client_id: "test_client_id".to_string(),
            hh_redirect_uri: "http://localhost:8001/auth/callback".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: None,
            port: 8001,
            hh_client_secret: "test_secret".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            oauth_state_key: b"test_state_key".to_vec(),
            token_encryption_key: vec![0u8; 32],
        }
    }
}

/// Decode and validate the base64-encoded 32-byte token encryption key.
fn decode_encryption_key(key_base64: &str) -> Result<Vec<u8>, ConfigError> {
    let key = BASE64
        .decode(key_base64.trim())
        .map_err(|_| ConfigError::Invalid("TOKEN_ENCRYPTION_KEY is not valid base64"))?;

    if key.len() != 32 {
        return Err(ConfigError::Invalid(
            "TOKEN_ENCRYPTION_KEY must decode to exactly 32 bytes",
        ));
    }

    Ok(key)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value: {0}")]
    Invalid(&'static str),
}
