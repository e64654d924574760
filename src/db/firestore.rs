// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! Firestore-backed credential store.
//!
//! Layout:
//! - `users/{user_id}`        — principal profile
//! - `credentials/{user_id}`  — current token record for the principal
//! - `hh_index/{hh_user_id}`  — maps provider identity to local user ID
//!
//! The principal+credential upsert and the conditional credential write run
//! inside Firestore transactions so no half-written state is ever visible.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::{collections, CredentialStore, CredentialWrite};
use crate::error::AppError;
use crate::models::{Credential, Principal};
use crate::services::provider::HhProfile;

/// Index document pointing a HeadHunter identity at its local principal.
#[derive(Debug, Serialize, Deserialize)]
struct HhIndexEntry {
    user_id: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    async fn index_entry(&self, hh_user_id: &str) -> Result<Option<HhIndexEntry>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::HH_INDEX)
            .obj()
            .one(hh_user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for FirestoreStore {
    async fn principal(&self, user_id: &str) -> Result<Option<Principal>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_principal_by_hh_id(
        &self,
        hh_user_id: &str,
    ) -> Result<Option<Principal>, AppError> {
        match self.index_entry(hh_user_id).await? {
            Some(entry) => self.principal(&entry.user_id).await,
            None => Ok(None),
        }
    }

    async fn credential(&self, user_id: &str) -> Result<Option<Credential>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::CREDENTIALS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn save_authorization(
        &self,
        profile: &HhProfile,
        mut credential: Credential,
    ) -> Result<Principal, AppError> {
        let now = Utc::now().to_rfc3339();

        // Resolve the local identity first: repeated logins for one
        // HeadHunter identity must land on the same principal.
        let principal = match self.index_entry(&profile.id).await? {
            Some(entry) => {
                let existing = self.principal(&entry.user_id).await?.ok_or_else(|| {
                    AppError::Database(format!(
                        "hh_index points at missing principal {}",
                        entry.user_id
                    ))
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
                updated_at: now,
            },
        };

        credential.version = self
            .credential(&principal.user_id)
            .await?
            .map(|c| c.version + 1)
            .unwrap_or(1);

        let index_entry = HhIndexEntry {
            user_id: principal.user_id.clone(),
        };

        // All three documents commit together or not at all.
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        self.client
            .fluent()
            .update()
            .in_col(collections::HH_INDEX)
            .document_id(&principal.hh_user_id)
            .object(&index_entry)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add index to transaction: {}", e)))?;

        self.client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&principal.user_id)
            .object(&principal)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add principal to transaction: {}", e))
            })?;

        self.client
            .fluent()
            .update()
            .in_col(collections::CREDENTIALS)
            .document_id(&principal.user_id)
            .object(&credential)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add credential to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id = %principal.user_id,
            hh_user_id = %principal.hh_user_id,
            "Authorization persisted"
        );

        Ok(principal)
    }

    async fn put_credential(
        &self,
        user_id: &str,
        credential: Credential,
        expected_version: i64,
    ) -> Result<CredentialWrite, AppError> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<Credential> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::CREDENTIALS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read credential in transaction: {}", e))
            })?;

        let matches = current
            .as_ref()
            .map(|c| c.version == expected_version)
            .unwrap_or(false);

        if !matches {
            let _ = transaction.rollback().await;
            return Ok(CredentialWrite::Conflict);
        }

        self.client
            .fluent()
            .update()
            .in_col(collections::CREDENTIALS)
            .document_id(user_id)
            .object(&credential)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add credential to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(CredentialWrite::Stored)
    }
}
