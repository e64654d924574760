// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! OAuth token lifecycle manager.
//!
//! Owns the full life of a HeadHunter token pair:
//! - authorization-code exchange and first-login principal bootstrap
//! - deciding when a stored access token is still usable
//! - lazy, single-flight refresh per principal
//! - persistence through the credential store's conditional writes
//!
//! Concurrent requests for one principal never trigger more than one
//! provider refresh call: callers serialize on a per-user async mutex and
//! the store's version check catches anything that slips past it (other
//! process instances included).

use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::{CredentialStore, CredentialWrite};
use crate::error::AppError;
use crate::models::{Credential, Principal};
use crate::services::crypto::TokenCipher;
use crate::services::provider::{IdentityProvider, TokenGrant};

/// Margin before token expiration when we proactively refresh (5 minutes).
/// Covers provider clock skew and in-flight request latency.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Result of completing an authorization-code flow.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub principal: Principal,
    /// Plaintext access token for immediate use by the caller.
    pub access_token: String,
    /// Whether a new principal was created (vs. a repeat login).
    pub created: bool,
}

/// Token lifecycle manager. Cheap to clone; clones share the refresh locks.
#[derive(Clone)]
pub struct TokenManager {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn CredentialStore>,
    cipher: TokenCipher,
    /// Per-user mutex to serialize token refresh operations.
    refresh_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TokenManager {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn CredentialStore>,
        cipher: TokenCipher,
    ) -> Self {
        Self {
            provider,
            store,
            cipher,
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    // ─── Authorization-code flow ─────────────────────────────────────────

    /// Complete an authorization: exchange the code, resolve the principal,
    /// persist the credential.
    ///
    /// `redirect_uri` must match the original authorization request
    /// byte-for-byte. Authorization codes are single-use, so nothing here is
    /// retried: a rejected exchange is final for that code.
    pub async fn complete_authorization(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AuthOutcome, AppError> {
        if code.is_empty() {
            return Err(AppError::BadRequest(
                "Missing authorization code".to_string(),
            ));
        }

        let grant = self.provider.exchange_code(code, redirect_uri).await?;

        // No principal can be resolved without the profile, so a failure
        // here is fatal for the whole call.
        let profile = self.provider.fetch_profile(&grant.access_token).await?;

        let created = self
            .store
            .find_principal_by_hh_id(&profile.id)
            .await?
            .is_none();

        let credential = self.build_credential(&grant, 0)?;
        let principal = self.store.save_authorization(&profile, credential).await?;

        tracing::info!(
            user_id = %principal.user_id,
            hh_user_id = %principal.hh_user_id,
            created,
            "Authorization completed, credential stored"
        );

        Ok(AuthOutcome {
            principal,
            access_token: grant.access_token,
            created,
        })
    }

    // ─── Token state machine ─────────────────────────────────────────────

    /// Get a valid (non-expired) access token for the given user.
    ///
    /// State machine per principal:
    /// - no credential on record        -> `NoCredential`
    /// - token valid past the margin    -> return it, no network call
    /// - expiring or expired            -> single-flight refresh
    /// - refresh token known dead       -> `ReauthorizationRequired`
    pub async fn ensure_valid_token(&self, user_id: &str) -> Result<String, AppError> {
        // Fast path: stored token still comfortably valid.
        let current = self.read_credential(user_id).await?;
        if let Some(token) = self.token_if_valid(&current)? {
            return Ok(token);
        }

        // Acquire the per-user refresh lock. Only one task per user performs
        // the refresh; the rest wait here and share its outcome.
        let lock = self
            .refresh_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-check after acquiring the lock: another task may have finished
        // the refresh while we were waiting.
        let current = self.read_credential(user_id).await?;
        if let Some(token) = self.token_if_valid(&current)? {
            return Ok(token);
        }

        self.refresh_locked(user_id, current).await
    }

    /// Perform the actual refresh. Caller holds the per-user lock.
    async fn refresh_locked(
        &self,
        user_id: &str,
        current: Credential,
    ) -> Result<String, AppError> {
        let refresh_token = self.cipher.decrypt(&current.refresh_token)?;

        tracing::info!(user_id, "Access token expired, refreshing");

        let grant = match self.provider.refresh_token(&refresh_token).await {
            Ok(grant) => grant,
            Err(AppError::ReauthorizationRequired) => {
                // invalid_grant: either the refresh token is genuinely dead,
                // or another process instance already rotated the pair and
                // ours went stale. A newer stored version means the race.
                if let Some(winner) = self.store.credential(user_id).await? {
                    if winner.version > current.version && !winner.needs_reauth {
                        tracing::info!(
                            user_id,
                            "Refresh race lost to another instance, adopting its token"
                        );
                        return self.cipher.decrypt(&winner.access_token);
                    }
                }

                self.mark_needs_reauth(user_id, current).await?;
                return Err(AppError::ReauthorizationRequired);
            }
            // Transient trouble or a config-level rejection: report it and
            // leave the stored (expired) credential for the next attempt.
            Err(e) => return Err(e),
        };

        let refreshed = self.build_credential(&grant, current.version + 1)?;

        match self
            .store
            .put_credential(user_id, refreshed, current.version)
            .await?
        {
            CredentialWrite::Stored => {
                tracing::info!(user_id, "Token refreshed");
                Ok(grant.access_token)
            }
            CredentialWrite::Conflict => {
                // Lost the persist race. The winner's record is
                // authoritative; never overwrite it with ours.
                tracing::info!(user_id, "Concurrent refresh won the write, using its token");
                let winner = self.read_credential(user_id).await?;
                if winner.needs_reauth {
                    return Err(AppError::ReauthorizationRequired);
                }
                self.cipher.decrypt(&winner.access_token)
            }
        }
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    async fn read_credential(&self, user_id: &str) -> Result<Credential, AppError> {
        self.store
            .credential(user_id)
            .await?
            .ok_or(AppError::NoCredential)
    }

    /// Decrypted access token when the credential is alive and valid past
    /// the refresh margin; `None` when a refresh is due.
    fn token_if_valid(&self, credential: &Credential) -> Result<Option<String>, AppError> {
        if credential.needs_reauth {
            return Err(AppError::ReauthorizationRequired);
        }

        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
        if Utc::now() + margin < credential.expires_at {
            return Ok(Some(self.cipher.decrypt(&credential.access_token)?));
        }

        Ok(None)
    }

    fn build_credential(&self, grant: &TokenGrant, version: i64) -> Result<Credential, AppError> {
        let now = Utc::now();
        Ok(Credential {
            access_token: self.cipher.encrypt(&grant.access_token)?,
            refresh_token: self.cipher.encrypt(&grant.refresh_token)?,
            // Wall-clock receipt time plus the provider-reported lifetime.
            expires_at: now + Duration::seconds(grant.expires_in),
            token_type: grant.token_type.clone(),
            scope: grant.scope.clone(),
            version,
            needs_reauth: false,
            updated_at: now.to_rfc3339(),
        })
    }

    /// Persist the dead-token marker so later calls fail without a network
    /// round trip, until a new authorization replaces the credential.
    async fn mark_needs_reauth(&self, user_id: &str, current: Credential) -> Result<(), AppError> {
        let expected = current.version;
        let dead = Credential {
            needs_reauth: true,
            version: current.version + 1,
            updated_at: Utc::now().to_rfc3339(),
            ..current
        };

        if self.store.put_credential(user_id, dead, expected).await? == CredentialWrite::Conflict {
            // Someone replaced the credential while we were marking it dead;
            // their record stands.
            tracing::debug!(user_id, "Credential changed while marking dead, leaving it");
        } else {
            tracing::warn!(user_id, "Refresh token dead, re-authorization required");
        }

        Ok(())
    }
}
