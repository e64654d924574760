// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    /// No token was ever issued for this user. The caller must start the
    /// authorization flow from scratch.
    #[error("No stored credential for user")]
    NoCredential,

    /// HeadHunter confirmed the refresh token is dead (`invalid_grant`).
    /// Only a new authorization-code exchange can recover from this.
    #[error("Refresh token rejected, re-authorization required")]
    ReauthorizationRequired,

    /// Transient provider failure (network, timeout, 5xx). Safe to retry
    /// later; no stored state was changed.
    #[error("HeadHunter unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider rejected the request outright (non-transient 4xx).
    #[error("HeadHunter rejected the request: {0}")]
    ProviderRejected(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::NoCredential => (StatusCode::UNAUTHORIZED, "no_credential", None),
            AppError::ReauthorizationRequired => {
                (StatusCode::UNAUTHORIZED, "reauthorization_required", None)
            }
            AppError::ProviderUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "provider_unavailable",
                Some(msg.clone()),
            ),
            AppError::ProviderRejected(msg) => (
                StatusCode::BAD_GATEWAY,
                "provider_rejected",
                Some(msg.clone()),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl AppError {
    /// True when the caller may retry the same request later without a new
    /// authorization (transient provider trouble).
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ProviderUnavailable(_))
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
