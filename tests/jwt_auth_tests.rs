// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! JWT session token tests.
//!
//! These verify that tokens minted by the auth routes can be decoded by the
//! auth middleware, catching compatibility issues early.

use jobhunter_api::middleware::auth::{create_jwt, Claims};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

#[test]
fn test_jwt_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";
    let user_id = "b9a6f5a0-1c7e-4e7e-9b43-6b2d9a3c1111";

    let token = create_jwt(user_id, signing_key).unwrap();

    // Decode the way the middleware does.
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, user_id);
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_jwt_rejects_wrong_key() {
    let token = create_jwt("some-user", b"right_key_right_key_right_key!!!").unwrap();

    let key = DecodingKey::from_secret(b"wrong_key_wrong_key_wrong_key!!!");
    let validation = Validation::new(Algorithm::HS256);

    assert!(decode::<Claims>(&token, &key, &validation).is_err());
}
