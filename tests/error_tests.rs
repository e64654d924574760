// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! Error-to-response mapping tests.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use jobhunter_api::error::AppError;

async fn response_parts(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_no_credential_maps_to_401() {
    let (status, body) = response_parts(AppError::NoCredential).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "no_credential");
}

#[tokio::test]
async fn test_reauthorization_required_maps_to_401() {
    let (status, body) = response_parts(AppError::ReauthorizationRequired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "reauthorization_required");
}

#[tokio::test]
async fn test_provider_unavailable_is_retryable_503() {
    let err = AppError::ProviderUnavailable("timeout".to_string());
    assert!(err.is_retryable());

    let (status, body) = response_parts(err).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "provider_unavailable");
    assert_eq!(body["details"], "timeout");
}

#[tokio::test]
async fn test_provider_rejected_maps_to_502() {
    let err = AppError::ProviderRejected("HTTP 400".to_string());
    assert!(!err.is_retryable());

    let (status, body) = response_parts(err).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "provider_rejected");
}

#[tokio::test]
async fn test_unauthorized_and_bad_request() {
    let (status, body) = response_parts(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = response_parts(AppError::BadRequest("bad".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_database_error_hides_details() {
    let (status, body) = response_parts(AppError::Database("connection refused".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}
