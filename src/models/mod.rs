// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! Data models for the application.

pub mod user;

pub use user::{Credential, Principal};
