// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! Services module - business logic layer.

pub mod crypto;
pub mod hh;
pub mod provider;
pub mod tokens;

pub use crypto::TokenCipher;
pub use hh::HhClient;
pub use provider::{HhProfile, IdentityProvider, TokenGrant};
pub use tokens::{AuthOutcome, TokenManager};
