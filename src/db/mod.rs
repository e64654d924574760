//! Credential store layer.
//!
//! The token lifecycle manager talks to storage only through the
//! [`CredentialStore`] trait: atomic reads, an atomic
//! principal-plus-credential upsert, and a conditional (compare-and-swap)
//! credential write. `db::firestore` is the durable production backend;
//! `db::memory` backs tests and offline development.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Credential, Principal};
use crate::services::provider::HhProfile;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const CREDENTIALS: &str = "credentials";
    /// Maps HeadHunter user IDs to local user IDs.
    pub const HH_INDEX: &str = "hh_index";
}

/// Outcome of a conditional credential write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialWrite {
    /// The stored record was replaced.
    Stored,
    /// The stored version no longer matched `expected_version`: a concurrent
    /// writer got there first. Resolved internally by re-reading the winner;
    /// never surfaced to callers.
    Conflict,
}

/// Durable keyed storage for principals and their credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a principal by local user ID.
    async fn principal(&self, user_id: &str) -> Result<Option<Principal>, AppError>;

    /// Look up a principal by its HeadHunter identity.
    async fn find_principal_by_hh_id(
        &self,
        hh_user_id: &str,
    ) -> Result<Option<Principal>, AppError>;

    /// Current credential for a principal, if any was ever issued.
    async fn credential(&self, user_id: &str) -> Result<Option<Credential>, AppError>;

    /// Persist a completed authorization as one atomic unit.
    ///
    /// Upserts the principal for `profile` (existing principals keep their
    /// `user_id` and `created_at`; a new one gets a freshly generated UUID)
    /// and replaces its credential. The store assigns the credential the
    /// next version number. A principal without its credential, or the
    /// reverse, is never observable.
    async fn save_authorization(
        &self,
        profile: &HhProfile,
        credential: Credential,
    ) -> Result<Principal, AppError>;

    /// Replace the current credential only if its stored version still
    /// equals `expected_version`.
    async fn put_credential(
        &self,
        user_id: &str,
        credential: Credential,
        expected_version: i64,
    ) -> Result<CredentialWrite, AppError>;
}
