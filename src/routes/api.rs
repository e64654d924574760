// SPDX-License-Identifier: MIT
// Copyright 2026 Alexey Sokolov <a.sokolov@techinnovate.ru>

//! API routes for authenticated users.
//!
//! Every handler goes through `TokenManager::ensure_valid_token` first, so
//! the HeadHunter token is transparently refreshed when needed and the
//! caller sees a clean unauthorized/retryable split on failure.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::hh::{HhVacancy, VacancyFilter};
use crate::services::provider::IdentityProvider;
use crate::AppState;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/profile", get(get_user_profile))
        .route("/resumes/mine", get(get_my_resumes))
        .route("/vacancies/search", get(search_vacancies))
}

// ─── User Profile ────────────────────────────────────────────

/// Profile response shaped for the frontend.
#[derive(Serialize)]
pub struct UserProfileResponse {
    pub id: String,
    pub email: Option<String>,
    /// "first last"
    pub name: String,
    /// "last first middle"
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub phone: Option<String>,
    pub hh_id: String,
}

/// Get the user's live profile from the HeadHunter API.
async fn get_user_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfileResponse>> {
    let access_token = state.tokens.ensure_valid_token(&user.user_id).await?;
    let profile = state.hh.fetch_profile(&access_token).await?;

    let name = format!("{} {}", profile.first_name, profile.last_name)
        .trim()
        .to_string();
    let full_name = match &profile.middle_name {
        Some(middle) => format!("{} {} {}", profile.last_name, profile.first_name, middle),
        None => format!("{} {}", profile.last_name, profile.first_name),
    }
    .trim()
    .to_string();

    Ok(Json(UserProfileResponse {
        id: profile.id.clone(),
        email: profile.email,
        name,
        full_name,
        first_name: profile.first_name,
        last_name: profile.last_name,
        middle_name: profile.middle_name,
        phone: profile.phone,
        hh_id: profile.id,
    }))
}

// ─── Resumes ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ResumesResponse {
    pub items: Vec<serde_json::Value>,
    pub found: u64,
}

/// List the user's resumes.
async fn get_my_resumes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ResumesResponse>> {
    let access_token = state.tokens.ensure_valid_token(&user.user_id).await?;
    let resumes = state.hh.get_resumes(&access_token).await?;

    let found = resumes.items.len() as u64;
    Ok(Json(ResumesResponse {
        items: resumes.items,
        found,
    }))
}

// ─── Vacancy Search ──────────────────────────────────────────

/// Flat vacancy shape the frontend consumes.
#[derive(Serialize)]
pub struct VacancyResponse {
    pub id: String,
    pub name: String,
    pub employer_name: String,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    pub currency: Option<String>,
    pub area_name: String,
    pub published_at: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct VacancySearchResult {
    pub items: Vec<VacancyResponse>,
    pub found: u64,
    pub page: u32,
    pub pages: u32,
}

impl From<HhVacancy> for VacancyResponse {
    fn from(vacancy: HhVacancy) -> Self {
        let (salary_from, salary_to, currency) = match vacancy.salary {
            Some(salary) => (salary.from, salary.to, salary.currency),
            None => (None, None, None),
        };

        Self {
            id: vacancy.id,
            name: vacancy.name,
            employer_name: vacancy.employer.map(|e| e.name).unwrap_or_default(),
            salary_from,
            salary_to,
            currency,
            area_name: vacancy.area.map(|a| a.name).unwrap_or_default(),
            published_at: vacancy.published_at,
            url: vacancy.alternate_url,
        }
    }
}

/// Search vacancies through the HeadHunter API.
async fn search_vacancies(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<VacancyFilter>,
) -> Result<Json<VacancySearchResult>> {
    let access_token = state.tokens.ensure_valid_token(&user.user_id).await?;
    let response = state.hh.search_vacancies(&access_token, &filter).await?;

    Ok(Json(VacancySearchResult {
        items: response.items.into_iter().map(Into::into).collect(),
        found: response.found,
        page: response.page,
        pages: response.pages,
    }))
}
