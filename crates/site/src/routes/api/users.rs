//! Admin-only user API route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::directory::{
    DirectoryUser, PAGE_SIZE, SortField, SortOrder, StatusFilter, UserQuery,
};
use crate::error::{AppError, Result};
use crate::identity::{SESSION_COOKIE, SessionTokens};
use crate::state::AppState;

/// Whether the caller's session belongs to the configured administrator.
///
/// A provider error counts as not-admin here: unlike page navigation, an
/// admin API response must never be served on a failed check.
async fn check_is_admin(state: &AppState, jar: &CookieJar) -> bool {
    let Some(identity) = state.identity() else {
        return false;
    };

    let Some(tokens) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| SessionTokens::from_cookie_value(c.value()))
    else {
        return false;
    };

    let check = match identity.current_user(&tokens).await {
        Ok(check) => check,
        Err(err) => {
            tracing::error!(error = %err, "session check failed for admin API");
            return false;
        }
    };

    let Some(user) = check.user else {
        return false;
    };

    state
        .config()
        .admin_email
        .as_ref()
        .is_none_or(|admin| user.email == *admin)
}

/// Aggregate user counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: u64,
    pub active_users: u64,
    pub new_users: u64,
}

/// Return total/active/new-this-month user counts.
///
/// # Errors
///
/// Returns 403 when the caller is not the administrator and 500 when the
/// directory cannot be queried.
#[instrument(skip(state, jar))]
pub async fn stats(State(state): State<AppState>, jar: CookieJar) -> Result<Json<StatsResponse>> {
    if !check_is_admin(&state, &jar).await {
        return Err(AppError::Forbidden("not the administrator".to_string()));
    }

    let directory = state
        .directory()
        .ok_or_else(|| AppError::Internal("user directory is not configured".to_string()))?;

    let stats = directory.stats().await?;

    Ok(Json(StatsResponse {
        total_users: stats.total,
        active_users: stats.active,
        new_users: stats.new_this_month,
    }))
}

/// User list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub order: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

const fn default_page() -> u32 {
    1
}

/// User list response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub users: Vec<DirectoryUser>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Return one page of the user table.
///
/// Mirrors the dashboard's query surface: substring search over email and
/// name, all/active/inactive filter, sort by email/name/creation time.
///
/// # Errors
///
/// Returns 403 when the caller is not the administrator and 500 when the
/// directory cannot be queried.
#[instrument(skip(state, jar))]
pub async fn list(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    if !check_is_admin(&state, &jar).await {
        return Err(AppError::Forbidden("not the administrator".to_string()));
    }

    let directory = state
        .directory()
        .ok_or_else(|| AppError::Internal("user directory is not configured".to_string()))?;

    let page = params.page.max(1);
    let query = UserQuery {
        search: Some(params.search),
        status: StatusFilter::parse(&params.status),
        sort: SortField::parse(&params.sort),
        order: SortOrder::parse(&params.order),
        page,
    };

    let result = directory.list(&query).await?;

    Ok(Json(ListResponse {
        users: result.users,
        total_count: result.total,
        page,
        page_size: PAGE_SIZE,
    }))
}
