//! The admin route gate.
//!
//! Intercepts every request whose path falls under the reserved `/admin`
//! prefix and decides, once per request, between exactly three outcomes:
//!
//! - **Pass-through** (with the refreshed session cookie attached) when a
//!   valid session exists and its principal is the configured administrator.
//! - **Redirect to login**, carrying the originally requested path in a
//!   `redirect` query parameter, when no valid session exists.
//! - **Redirect to unauthorized** when the session is valid but its
//!   principal is not the administrator.
//!
//! The login and unauthorized pages are always passed through, to avoid a
//! redirect loop. When the identity service is not configured, or the
//! provider cannot be consulted, the gate fails open: availability of the
//! site wins over strictness of the gate. That branch is a configuration
//! decision, not a missing error path.
//!
//! The gate reads the session once per request; when the provider rotates
//! the tokens, the refreshed cookie must travel back on the response or the
//! browser's next request would arrive unauthenticated.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::identity::{SESSION_COOKIE, SessionCheck, SessionTokens, session_cookie};
use crate::state::AppState;

/// Reserved path prefix for the admin area.
pub const ADMIN_PREFIX: &str = "/admin";

/// Login page path, exempt from gating.
pub const LOGIN_PATH: &str = "/admin/login";

/// Unauthorized page path, exempt from gating.
pub const UNAUTHORIZED_PATH: &str = "/admin/unauthorized";

/// Whether a path falls under the reserved admin prefix.
#[must_use]
pub fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with("/admin/")
}

/// The login redirect for an originally requested path.
#[must_use]
pub fn login_redirect(original_path: &str) -> String {
    format!("{LOGIN_PATH}?redirect={}", urlencoding::encode(original_path))
}

/// Gate middleware applied to the whole router.
///
/// Non-admin paths pass straight through untouched.
pub async fn admin_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if !is_admin_path(&path) {
        return next.run(request).await;
    }

    // Fail open when the identity service is not configured, rather than
    // taking the whole admin area down with it.
    let Some(identity) = state.identity().cloned() else {
        tracing::warn!("identity service not configured; admin routes are ungated");
        return next.run(request).await;
    };

    let exempt = path == LOGIN_PATH || path == UNAUTHORIZED_PATH;

    // No cookie (or a garbled one) means no session; nothing to refresh.
    let tokens = jar
        .get(SESSION_COOKIE)
        .and_then(|c| SessionTokens::from_cookie_value(c.value()));

    let Some(tokens) = tokens else {
        if exempt {
            return next.run(request).await;
        }
        return Redirect::to(&login_redirect(&path)).into_response();
    };

    let check = match identity.current_user(&tokens).await {
        Ok(check) => check,
        Err(err) => {
            // Provider unreachable: fail open rather than breaking the site.
            tracing::error!(error = %err, path = %path, "session check failed; failing open");
            return next.run(request).await;
        }
    };

    let SessionCheck { user, refreshed } = check;

    // Any response leaving the gate carries the rotated cookie, including
    // the exempt pages and the redirects below.
    let jar = match &refreshed {
        Some(fresh) => jar.add(session_cookie(fresh, state.config().secure_cookies())),
        None => jar,
    };

    if exempt {
        return (jar, next.run(request).await).into_response();
    }

    let Some(user) = user else {
        return (jar, Redirect::to(&login_redirect(&path))).into_response();
    };

    if let Some(admin_email) = &state.config().admin_email
        && user.email != *admin_email
    {
        tracing::warn!(principal = %user.email, path = %path, "non-admin principal on admin path");
        return (jar, Redirect::to(UNAUTHORIZED_PATH)).into_response();
    }

    (jar, next.run(request).await).into_response()
}
