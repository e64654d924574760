// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! HeadHunter OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/hh", get(auth_start))
        .route("/auth/callback", get(auth_callback))
}

/// Query parameters for starting OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Frontend URL to redirect back to after OAuth completes.
    /// If not provided, uses FRONTEND_URL.
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Start OAuth flow - redirect to the HeadHunter consent screen.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
) -> Result<Redirect> {
    let frontend_url = params
        .redirect_uri
        .unwrap_or_else(|| state.config.frontend_url.clone());

    let oauth_state = sign_state(&frontend_url, &state.config.oauth_state_key)?;

    let auth_url = state
        .hh
        .authorize_url(&state.config.hh_redirect_uri, &oauth_state);

    tracing::info!(
        client_id = %state.config.hh_client_id,
        frontend_url = %frontend_url,
        "Starting OAuth flow, redirecting to HeadHunter"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth callback - exchange code for tokens, create session.
///
/// Failures redirect back to the frontend with a stable machine-readable
/// error code: `no_code`, `oauth_error`, `provider_unavailable` or
/// `provider_rejected`.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    // Decode and verify the frontend URL from the state parameter.
    let frontend_url = params
        .state
        .as_deref()
        .and_then(|s| verify_and_decode_state(s, &state.config.oauth_state_key))
        .unwrap_or_else(|| {
            tracing::warn!(
                "Invalid or missing state parameter, falling back to default frontend URL"
            );
            state.config.frontend_url.clone()
        });

    // The user denied consent or HeadHunter reported an authorization error.
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from HeadHunter");
        let message = params
            .error_description
            .unwrap_or_else(|| "OAuth error".to_string());
        return Ok(error_redirect(&frontend_url, "oauth_error", &message));
    }

    let code = match params.code.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => {
            tracing::warn!("No code parameter received");
            return Ok(error_redirect(
                &frontend_url,
                "no_code",
                "Authorization cancelled",
            ));
        }
    };

    tracing::info!("Exchanging authorization code for tokens");

    let outcome = match state
        .tokens
        .complete_authorization(code, &state.config.hh_redirect_uri)
        .await
    {
        Ok(outcome) => outcome,
        Err(e @ AppError::ProviderUnavailable(_)) => {
            tracing::warn!(error = %e, "HeadHunter unavailable during authorization");
            return Ok(error_redirect(
                &frontend_url,
                "provider_unavailable",
                "HeadHunter is unavailable, try again later",
            ));
        }
        Err(e @ (AppError::ProviderRejected(_) | AppError::BadRequest(_))) => {
            tracing::warn!(error = %e, "HeadHunter rejected the authorization");
            return Ok(error_redirect(
                &frontend_url,
                "provider_rejected",
                "Authorization failed",
            ));
        }
        Err(e) => return Err(e),
    };

    let status = if outcome.created {
        "created"
    } else {
        "logged_in"
    };

    tracing::info!(
        user_id = %outcome.principal.user_id,
        status,
        "OAuth successful, user and tokens stored"
    );

    // Create JWT session token and hand it to the frontend.
    let jwt = create_jwt(&outcome.principal.user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let redirect_url = format!(
        "{}?token={}&user_id={}&status={}",
        frontend_url, jwt, outcome.principal.user_id, status
    );

    Ok(Redirect::temporary(&redirect_url))
}

fn error_redirect(frontend_url: &str, code: &str, message: &str) -> Redirect {
    let url = format!(
        "{}?error={}&message={}",
        frontend_url,
        code,
        urlencoding::encode(message)
    );
    Redirect::temporary(&url)
}

/// Sign the frontend URL + timestamp into an opaque OAuth `state` value.
fn sign_state(frontend_url: &str, secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    // Data payload: "frontend_url|timestamp_hex"
    let payload = format!("{}|{:x}", frontend_url, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    // "payload|signature_hex", base64-encoded for the URL.
    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify HMAC signature and decode the frontend URL from the OAuth state
/// parameter.
fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "frontend_url|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let frontend_url = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    let payload = format!("{}|{}", frontend_url, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());

    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(frontend_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        let secret = b"secret_key";
        let encoded = sign_state("https://example.com", secret).unwrap();

        let result = verify_and_decode_state(&encoded, secret);
        assert_eq!(result, Some("https://example.com".to_string()));
    }

    #[test]
    fn test_state_invalid_signature() {
        let secret = b"secret_key";
        let payload = format!("{}|{:x}", "https://example.com", 1234567890u128);
        let state_data = format!("{}|{}", payload, "invalid_signature");
        let encoded = URL_SAFE_NO_PAD.encode(state_data.as_bytes());

        assert_eq!(verify_and_decode_state(&encoded, secret), None);
    }

    #[test]
    fn test_state_wrong_secret() {
        let encoded = sign_state("https://example.com", b"secret_key").unwrap();
        assert_eq!(verify_and_decode_state(&encoded, b"wrong_key"), None);
    }

    #[test]
    fn test_state_malformed() {
        let encoded = URL_SAFE_NO_PAD.encode("invalid|format");
        assert_eq!(verify_and_decode_state(&encoded, b"secret_key"), None);
    }
}
