// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! Authentication checks on the protected API surface.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use jobhunter_api::middleware::auth::create_jwt;
use tower::ServiceExt; // for oneshot

mod common;
use common::create_test_app;

#[tokio::test]
async fn test_health_requires_no_auth() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_reject_missing_token() {
    for uri in ["/user/profile", "/resumes/mine", "/vacancies/search"] {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_protected_routes_reject_garbage_token() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/user/profile")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_session_without_credential_maps_to_no_credential() {
    let (app, state) = create_test_app();

    // A correctly signed session for a user that never authorized with HH.
    let jwt = create_jwt("ghost-user", &state.config.jwt_signing_key).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/user/profile")
                .header(header::AUTHORIZATION, format!("Bearer {}", jwt))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "no_credential");
}
