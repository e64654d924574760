// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! HeadHunter API client.
//!
//! Handles:
//! - OAuth token exchange and refresh against hh.ru
//! - Authenticated profile fetch (`/me`)
//! - Vacancy search and resume listing on the user's behalf

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppError;
use crate::services::provider::{HhProfile, IdentityProvider, TokenGrant};

/// Bound on every outbound call to hh.ru. A timeout is reported as
/// `ProviderUnavailable`, never treated as a token invalidation.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// hh.ru requires a User-Agent identifying the application.
const USER_AGENT: &str = "JobHunter Pro (a.sokolov@techinnovate.ru)";

/// HeadHunter API client.
#[derive(Clone)]
pub struct HhClient {
    http: reqwest::Client,
    oauth_url: String,
    base_url: String,
    client_id: String,
    client_secret: String,
}

/// OAuth error body returned by hh.ru on failed token requests.
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl HhClient {
    /// Create a new HeadHunter client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            oauth_url: "https://hh.ru/oauth".to_string(),
            base_url: "https://api.hh.ru".to_string(),
            client_id,
            client_secret,
        }
    }

    /// The authorization URL users are sent to for the consent screen.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/authorize?response_type=code&client_id={}&redirect_uri={}&state={}",
            self.oauth_url,
            self.client_id,
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        )
    }

    // ─── Job Board API ───────────────────────────────────────────────────

    /// Search vacancies with the user's token.
    pub async fn search_vacancies(
        &self,
        access_token: &str,
        filter: &VacancyFilter,
    ) -> Result<VacancySearchResponse, AppError> {
        let url = format!("{}/vacancies", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("page", filter.page.to_string()),
            ("per_page", filter.per_page.to_string()),
        ];
        if let Some(text) = &filter.text {
            query.push(("text", text.clone()));
        }
        if let Some(area) = filter.area {
            query.push(("area", area.to_string()));
        }
        if let Some(salary) = filter.salary {
            query.push(("salary", salary.to_string()));
        }
        if let Some(experience) = &filter.experience {
            query.push(("experience", experience.clone()));
        }
        if let Some(employment) = &filter.employment {
            query.push(("employment", employment.clone()));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(e.to_string()))?;

        check_response_json(response).await
    }

    /// List the user's resumes (`/resumes/mine`).
    pub async fn get_resumes(&self, access_token: &str) -> Result<ResumeList, AppError> {
        let url = format!("{}/resumes/mine", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(e.to_string()))?;

        check_response_json(response).await
    }

    // ─── OAuth internals ─────────────────────────────────────────────────

    async fn post_token_form(
        &self,
        form: &[(&str, &str)],
    ) -> Result<reqwest::Response, AppError> {
        self.http
            .post(format!("{}/token", self.oauth_url))
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("Token request failed: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for HhClient {
    /// Exchange an authorization code for a token pair.
    ///
    /// Codes are single-use: any 4xx (expired code, redirect-URI mismatch,
    /// bad client credentials) is `ProviderRejected` and must not be retried
    /// with the same code.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant, AppError> {
        let response = self
            .post_token_form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.is_server_error() {
                return Err(AppError::ProviderUnavailable(format!(
                    "Token exchange failed with HTTP {}",
                    status
                )));
            }

            tracing::error!(status = %status, body = %body, "HH token exchange rejected");
            return Err(AppError::ProviderRejected(format!(
                "Token exchange failed with HTTP {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ProviderRejected(format!("Invalid token response: {}", e)))
    }

    /// Trade a refresh token for a new pair.
    ///
    /// `invalid_grant` means the refresh token is dead (revoked or already
    /// rotated by a concurrent refresh) and maps to `ReauthorizationRequired`;
    /// the caller decides whether that is terminal or a lost race.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, AppError> {
        let response = self
            .post_token_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.is_server_error() {
                return Err(AppError::ProviderUnavailable(format!(
                    "Token refresh failed with HTTP {}",
                    status
                )));
            }

            let oauth_error: OAuthErrorBody = serde_json::from_str(&body).unwrap_or_else(|_| {
                OAuthErrorBody {
                    error: String::new(),
                    error_description: None,
                }
            });

            if oauth_error.error == "invalid_grant" {
                tracing::warn!("HH rejected refresh token with invalid_grant");
                return Err(AppError::ReauthorizationRequired);
            }

            tracing::error!(status = %status, error = %oauth_error.error, "HH token refresh rejected");
            return Err(AppError::ProviderRejected(format!(
                "Token refresh failed with HTTP {}: {}",
                status,
                oauth_error.error_description.unwrap_or(oauth_error.error),
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ProviderRejected(format!("Invalid token response: {}", e)))
    }

    /// Fetch the authenticated user's profile (`GET /me`).
    async fn fetch_profile(&self, access_token: &str) -> Result<HhProfile, AppError> {
        let url = format!("{}/me", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
///
/// 5xx is transient (`ProviderUnavailable`); 4xx means the request itself
/// was bad (`ProviderRejected`).
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_server_error() {
            return Err(AppError::ProviderUnavailable(format!("HTTP {}", status)));
        }

        return Err(AppError::ProviderRejected(format!(
            "HTTP {}: {}",
            status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::ProviderRejected(format!("JSON parse error: {}", e)))
}

// ─── API response types ──────────────────────────────────────────────────

/// Vacancy search filter (all fields optional except paging).
#[derive(Debug, Clone, Deserialize)]
pub struct VacancyFilter {
    pub text: Option<String>,
    pub area: Option<u32>,
    pub salary: Option<i64>,
    pub experience: Option<String>,
    pub employment: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_per_page() -> u32 {
    20
}

/// Paginated vacancy search response from hh.ru.
#[derive(Debug, Clone, Deserialize)]
pub struct VacancySearchResponse {
    pub items: Vec<HhVacancy>,
    pub found: u64,
    pub page: u32,
    pub pages: u32,
}

/// A vacancy as returned by the hh.ru search API (subset we expose).
#[derive(Debug, Clone, Deserialize)]
pub struct HhVacancy {
    pub id: String,
    pub name: String,
    pub employer: Option<HhEmployer>,
    pub salary: Option<HhSalary>,
    pub area: Option<HhArea>,
    pub published_at: String,
    pub alternate_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HhEmployer {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HhSalary {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HhArea {
    pub name: String,
}

/// Resume list response (`/resumes/mine`). Items are passed through as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct ResumeList {
    pub items: Vec<serde_json::Value>,
    #[serde(default)]
    pub found: u64,
}
