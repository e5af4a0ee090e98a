//! Admin area route handlers.
//!
//! Everything here sits behind the admin gate except the login and
//! unauthorized pages, which the gate always passes through. The dashboard
//! re-fetches the user table and stats from the directory on every render;
//! mutations redirect back to the dashboard so the next render reflects the
//! stored state rather than an optimistic local update.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::instrument;

use pressroom_core::UserId;

use crate::directory::{
    DirectoryUser, PAGE_SIZE, SortField, SortOrder, StatusFilter, UserPage, UserQuery, UserStats,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::identity::{
    IdentityError, SESSION_COOKIE, SessionTokens, clear_session_cookie, session_cookie,
};
use crate::middleware::LOGIN_PATH;
use crate::state::AppState;

/// Dashboard path, the default post-login target.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Create the admin area router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(index))
        .route("/admin/login", get(login_page).post(login))
        .route("/admin/logout", post(logout))
        .route("/admin/unauthorized", get(unauthorized))
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/users/{id}/toggle", post(toggle_user))
        .route("/admin/users/{id}/delete", post(delete_user))
}

/// `/admin` lands on the dashboard.
async fn index() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

// =============================================================================
// Login / logout
// =============================================================================

/// Login page query parameters.
#[derive(Debug, Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub redirect: String,
    pub error: Option<String>,
}

/// Display the login form.
pub async fn login_page(Query(params): Query<LoginParams>) -> LoginTemplate {
    LoginTemplate {
        redirect: sanitize_redirect(params.redirect.as_deref()),
        error: params
            .error
            .map(|_| "Invalid email or password.".to_string()),
    }
}

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect: String,
}

/// Exchange credentials at the identity provider and set the session cookie.
#[instrument(skip(state, jar, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let target = sanitize_redirect(Some(&form.redirect));

    let Some(identity) = state.identity() else {
        // Without a provider the gate is open and there is nothing to sign
        // in to.
        return Ok(Redirect::to(&target).into_response());
    };

    match identity.sign_in(form.email.trim(), &form.password).await {
        Ok((user, tokens)) => {
            tracing::info!(principal = %user.email, "admin login");
            let jar = jar.add(session_cookie(&tokens, state.config().secure_cookies()));
            Ok((jar, Redirect::to(&target)).into_response())
        }
        Err(IdentityError::InvalidCredentials) => {
            let back = format!(
                "{LOGIN_PATH}?error=1&redirect={}",
                urlencoding::encode(&target)
            );
            Ok(Redirect::to(&back).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// Revoke the session (best-effort) and clear the cookie.
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let tokens = jar
        .get(SESSION_COOKIE)
        .and_then(|c| SessionTokens::from_cookie_value(c.value()));

    if let (Some(identity), Some(tokens)) = (state.identity(), tokens)
        && let Err(err) = identity.sign_out(&tokens).await
    {
        tracing::warn!(error = %err, "sign-out call failed; clearing cookie anyway");
    }

    (jar.add(clear_session_cookie()), Redirect::to(LOGIN_PATH)).into_response()
}

/// Unauthorized page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/unauthorized.html")]
pub struct UnauthorizedTemplate {}

/// Display the unauthorized page.
pub async fn unauthorized() -> UnauthorizedTemplate {
    UnauthorizedTemplate {}
}

/// Only local paths may be redirect targets.
fn sanitize_redirect(raw: Option<&str>) -> String {
    match raw {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => DASHBOARD_PATH.to_string(),
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// User table query parameters.
#[derive(Debug, Deserialize)]
pub struct TableParams {
    #[serde(default)]
    pub q: String,
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

impl TableParams {
    fn to_query(&self) -> UserQuery {
        UserQuery {
            search: Some(self.q.clone()),
            status: StatusFilter::parse(&self.status),
            sort: SortField::parse(&self.sort),
            order: SortOrder::parse(&self.order),
            page: self.page.max(1),
        }
    }
}

/// A user row prepared for the table template.
#[derive(Debug, Clone)]
pub struct UserRowView {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: String,
    pub toggle_label: &'static str,
    /// The `is_active` value the toggle form submits.
    pub toggle_to: bool,
}

impl From<&DirectoryUser> for UserRowView {
    fn from(user: &DirectoryUser) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.to_string(),
            full_name: user.full_name.clone().unwrap_or_else(|| "-".to_string()),
            is_active: user.is_active,
            created_at: user.created_at.format("%b %d, %Y %H:%M").to_string(),
            toggle_label: if user.is_active {
                "Deactivate"
            } else {
                "Activate"
            },
            toggle_to: !user.is_active,
        }
    }
}

/// A sortable column header link.
#[derive(Debug, Clone)]
pub struct SortLink {
    pub url: String,
    pub active: bool,
    pub arrow: &'static str,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub directory_configured: bool,
    pub total_users: u64,
    pub active_users: u64,
    pub new_users: u64,
    pub users: Vec<UserRowView>,
    pub q: String,
    pub status: String,
    pub page: u32,
    pub page_count: u64,
    pub total: u64,
    pub showing_from: u64,
    pub showing_to: u64,
    pub sort_email: SortLink,
    pub sort_name: SortLink,
    pub sort_created: SortLink,
    pub filter_all_url: String,
    pub filter_active_url: String,
    pub filter_inactive_url: String,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    /// Canonical query string, round-tripped through mutation forms so the
    /// post-mutation redirect lands back on the same view.
    pub return_to: String,
}

/// Display the dashboard: aggregate stats plus the user table.
#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<DashboardTemplate> {
    let query = params.to_query();

    let Some(directory) = state.directory() else {
        return Ok(DashboardTemplate::build(
            &query,
            UserStats::default(),
            UserPage {
                users: Vec::new(),
                total: 0,
            },
            false,
        ));
    };

    // Stats and the current page are always fetched fresh; mutations
    // redirect back here rather than patching what the browser already has.
    let stats = directory.stats().await?;
    let page = directory.list(&query).await?;

    Ok(DashboardTemplate::build(&query, stats, page, true))
}

impl DashboardTemplate {
    fn build(query: &UserQuery, stats: UserStats, page: UserPage, configured: bool) -> Self {
        let q = query.search_term().unwrap_or("").to_string();
        let current_page = query.page.max(1);
        let page_count = page.page_count();

        let (showing_from, showing_to) = if page.total == 0 {
            (0, 0)
        } else {
            let from = u64::from(current_page - 1) * u64::from(PAGE_SIZE) + 1;
            let to = (u64::from(current_page) * u64::from(PAGE_SIZE)).min(page.total);
            (from, to)
        };

        let sort_link = |field: SortField| {
            let active = query.sort == field;
            let order = if active {
                query.order.toggled()
            } else {
                SortOrder::Desc
            };
            SortLink {
                url: table_url(&q, query.status, field, order, 1),
                active,
                arrow: if query.order == SortOrder::Asc {
                    "\u{2191}"
                } else {
                    "\u{2193}"
                },
            }
        };

        let filter_link =
            |status: StatusFilter| table_url(&q, status, query.sort, query.order, 1);

        let page_link = |page: u32| table_url(&q, query.status, query.sort, query.order, page);

        Self {
            directory_configured: configured,
            total_users: stats.total,
            active_users: stats.active,
            new_users: stats.new_this_month,
            users: page.users.iter().map(UserRowView::from).collect(),
            q: q.clone(),
            status: query.status.as_str().to_string(),
            page: current_page,
            page_count,
            total: page.total,
            showing_from,
            showing_to,
            sort_email: sort_link(SortField::Email),
            sort_name: sort_link(SortField::FullName),
            sort_created: sort_link(SortField::CreatedAt),
            filter_all_url: filter_link(StatusFilter::All),
            filter_active_url: filter_link(StatusFilter::Active),
            filter_inactive_url: filter_link(StatusFilter::Inactive),
            prev_url: (current_page > 1).then(|| page_link(current_page - 1)),
            next_url: (u64::from(current_page) < page_count)
                .then(|| page_link(current_page + 1)),
            return_to: table_query(&q, query.status, query.sort, query.order, current_page),
        }
    }
}

/// The canonical query string for a table view.
fn table_query(
    q: &str,
    status: StatusFilter,
    sort: SortField,
    order: SortOrder,
    page: u32,
) -> String {
    let mut query = format!(
        "?status={}&sort={}&order={}&page={page}",
        status.as_str(),
        sort.column(),
        order.as_str()
    );
    if !q.is_empty() {
        query.push_str("&q=");
        query.push_str(&urlencoding::encode(q));
    }
    query
}

fn table_url(q: &str, status: StatusFilter, sort: SortField, order: SortOrder, page: u32) -> String {
    format!("{DASHBOARD_PATH}{}", table_query(q, status, sort, order, page))
}

// =============================================================================
// Mutations
// =============================================================================

/// Toggle form fields.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub active: bool,
    #[serde(default)]
    pub return_to: String,
}

/// Activate or deactivate a user, then re-render the same table view.
#[instrument(skip(state, form))]
pub async fn toggle_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect> {
    let directory = state
        .directory()
        .ok_or_else(|| AppError::Internal("user directory is not configured".to_string()))?;

    directory.set_active(id, form.active).await?;
    tracing::info!(user_id = %id, active = form.active, "user status toggled");

    Ok(Redirect::to(&dashboard_return(&form.return_to)))
}

/// Delete form fields.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub return_to: String,
}

/// Delete a user row, then re-render the same table view.
///
/// The browser-side confirmation happens before this handler is reached;
/// by the time the form posts, the deletion is intended.
#[instrument(skip(state, form))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect> {
    let directory = state
        .directory()
        .ok_or_else(|| AppError::Internal("user directory is not configured".to_string()))?;

    directory.delete(id).await?;
    tracing::info!(user_id = %id, "user deleted");

    Ok(Redirect::to(&dashboard_return(&form.return_to)))
}

/// Rebuild the dashboard URL from a round-tripped query string.
fn dashboard_return(raw: &str) -> String {
    if raw.starts_with('?') && !raw.contains('/') {
        format!("{DASHBOARD_PATH}{raw}")
    } else {
        DASHBOARD_PATH.to_string()
    }
}
