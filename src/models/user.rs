//! Principal and credential models for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local user record, keyed by a HeadHunter-issued identity.
///
/// Exactly one principal exists per distinct `hh_user_id`; repeated logins
/// update the mutable profile fields in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Stable local identifier (UUID, assigned at first login; document ID)
    pub user_id: String,
    /// User ID from the HeadHunter API (unique)
    pub hh_user_id: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Middle name (patronymic)
    pub middle_name: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// When the user first connected (RFC 3339)
    pub created_at: String,
    /// Last profile update (RFC 3339)
    pub updated_at: String,
}

/// The OAuth token pair for one principal (tokens encrypted at rest).
///
/// At most one credential is current per principal. A refresh replaces the
/// whole record and bumps `version`; the store's conditional write compares
/// `version` so that concurrent refreshers cannot overwrite each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Encrypted access token (base64)
    pub access_token: String,
    /// Encrypted refresh token (base64)
    pub refresh_token: String,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
    /// Token type as reported by the provider (normally "bearer")
    pub token_type: String,
    /// Granted OAuth scope
    pub scope: String,
    /// Monotonically increasing record version (optimistic concurrency)
    pub version: i64,
    /// Set once HeadHunter rejects the refresh token with `invalid_grant`.
    /// A credential in this state is dead until a new authorization runs.
    pub needs_reauth: bool,
    /// Last write (RFC 3339)
    pub updated_at: String,
}
