// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! In-process credential store for tests and offline development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::db::{CredentialStore, CredentialWrite};
use crate::error::AppError;
use crate::models::{Credential, Principal};
use crate::services::provider::HhProfile;

#[derive(Default)]
struct Inner {
    principals: HashMap<String, Principal>,
    credentials: HashMap<String, Credential>,
    /// HeadHunter user ID -> local user ID
    hh_index: HashMap<String, String>,
}

/// Credential store backed by process memory. All writes go through one
/// lock, which gives the same atomicity the Firestore transactions provide.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::Database("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn principal(&self, user_id: &str) -> Result<Option<Principal>, AppError> {
        Ok(self.lock()?.principals.get(user_id).cloned())
    }

    async fn find_principal_by_hh_id(
        &self,
        hh_user_id: &str,
    ) -> Result<Option<Principal>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .hh_index
            .get(hh_user_id)
            .and_then(|user_id| inner.principals.get(user_id))
            .cloned())
    }

    async fn credential(&self, user_id: &str) -> Result<Option<Credential>, AppError> {
        Ok(self.lock()?.credentials.get(user_id).cloned())
    }

    async fn save_authorization(
        &self,
        profile: &HhProfile,
        mut credential: Credential,
    ) -> Result<Principal, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut inner = self.lock()?;

        let principal = match inner.hh_index.get(&profile.id).cloned() {
            Some(user_id) => {
                let existing = inner.principals.get(&user_id).cloned().ok_or_else(|| {
                    AppError::Database(format!("index points at missing principal {}", user_id))
                })?;
                Principal {
                    email: profile.email.clone(),
                    first_name: profile.first_name.clone(),
                    last_name: profile.last_name.clone(),
                    middle_name: profile.middle_name.clone(),
                    phone: profile.phone.clone(),
                    updated_at: now.clone(),
                    ..existing
                }
            }
            None => Principal {
                user_id: uuid::Uuid::new_v4().to_string(),
                hh_user_id: profile.id.clone(),
                email: profile.email.clone(),
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                middle_name: profile.middle_name.clone(),
                phone: profile.phone.clone(),
                created_at: now.clone(),
                updated_at: now.clone(),
            },
        };

        credential.version = inner
            .credentials
            .get(&principal.user_id)
            .map(|c| c.version + 1)
            .unwrap_or(1);

        inner
            .hh_index
            .insert(profile.id.clone(), principal.user_id.clone());
        inner
            .credentials
            .insert(principal.user_id.clone(), credential);
        inner
            .principals
            .insert(principal.user_id.clone(), principal.clone());

        Ok(principal)
    }

    async fn put_credential(
        &self,
        user_id: &str,
        credential: Credential,
        expected_version: i64,
    ) -> Result<CredentialWrite, AppError> {
        let mut inner = self.lock()?;

        match inner.credentials.get(user_id) {
            Some(current) if current.version == expected_version => {
                inner.credentials.insert(user_id.to_string(), credential);
                Ok(CredentialWrite::Stored)
            }
            _ => Ok(CredentialWrite::Conflict),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn profile(id: &str, email: &str) -> HhProfile {
        HhProfile {
            id: id.to_string(),
            email: Some(email.to_string()),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            middle_name: None,
            phone: None,
        }
    }

    fn credential(access: &str) -> Credential {
        Credential {
            access_token: access.to_string(),
            refresh_token: "rt".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            token_type: "bearer".to_string(),
            scope: String::new(),
            version: 0,
            needs_reauth: false,
            updated_at: Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_save_authorization_creates_then_updates() {
        let store = MemoryStore::new();

        let first = store
            .save_authorization(&profile("42", "a@x.com"), credential("at1"))
            .await
            .unwrap();
        assert_eq!(first.hh_user_id, "42");

        // Same provider identity logs in again: same local id, fresh fields.
        let second = store
            .save_authorization(&profile("42", "b@x.com"), credential("at2"))
            .await
            .unwrap();
        assert_eq!(second.user_id, first.user_id);
        assert_eq!(second.email.as_deref(), Some("b@x.com"));
        assert_eq!(second.created_at, first.created_at);

        let cred = store.credential(&first.user_id).await.unwrap().unwrap();
        assert_eq!(cred.access_token, "at2");
        assert_eq!(cred.version, 2);
    }

    #[tokio::test]
    async fn test_put_credential_version_check() {
        let store = MemoryStore::new();
        let principal = store
            .save_authorization(&profile("42", "a@x.com"), credential("at1"))
            .await
            .unwrap();

        let mut next = credential("at2");
        next.version = 2;
        let outcome = store
            .put_credential(&principal.user_id, next.clone(), 1)
            .await
            .unwrap();
        assert_eq!(outcome, CredentialWrite::Stored);

        // Stale expected version loses.
        let outcome = store
            .put_credential(&principal.user_id, next, 1)
            .await
            .unwrap();
        assert_eq!(outcome, CredentialWrite::Conflict);

        let current = store.credential(&principal.user_id).await.unwrap().unwrap();
        assert_eq!(current.access_token, "at2");
        assert_eq!(current.version, 2);
    }

    #[tokio::test]
    async fn test_put_credential_without_existing_record_conflicts() {
        let store = MemoryStore::new();
        let outcome = store
            .put_credential("nobody", credential("at"), 1)
            .await
            .unwrap();
        assert_eq!(outcome, CredentialWrite::Conflict);
    }
}
