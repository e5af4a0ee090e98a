//! Client for the hosted identity provider.
//!
//! The provider issues, validates, and refreshes sessions; the site never
//! stores a session server-side. This module owns the session-cookie
//! contract (name and encoded shape) since the tokens inside it are the
//! provider's, and exposes the handful of operations the site needs:
//! [`IdentityClient::current_user`], [`IdentityClient::sign_in`],
//! [`IdentityClient::sign_up`], and [`IdentityClient::sign_out`].

pub mod types;

pub use types::{AuthUser, SessionCheck, SessionTokens, SignUpResponse, TokenResponse};

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::instrument;

use crate::config::IdentityConfig;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "pr_session";

/// Session cookie lifetime (7 days).
const SESSION_TTL_DAYS: i64 = 7;

/// Errors that can occur when talking to the identity API.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an unexpected status.
    #[error("identity API returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Email/password pair was rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Signup was rejected by the provider (duplicate email, weak password).
    #[error("{0}")]
    Rejected(String),
}

/// Client for the hosted identity API.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    base_url: String,
    publishable_key: String,
}

impl IdentityClient {
    /// Create a new identity API client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.clone(),
                publishable_key: config.publishable_key.clone(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Resolve the principal for a set of session tokens, refreshing the
    /// session when the access token has expired or been invalidated.
    ///
    /// A stale or revoked session resolves to [`SessionCheck::signed_out`],
    /// not an error; errors mean the provider itself could not be consulted.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` on transport failures or unexpected statuses.
    #[instrument(skip(self, tokens))]
    pub async fn current_user(&self, tokens: &SessionTokens) -> Result<SessionCheck, IdentityError> {
        if tokens.is_expired() {
            return self.refresh(tokens).await;
        }

        let response = self
            .inner
            .client
            .get(self.endpoint("/auth/v1/user"))
            .header("apikey", &self.inner.publishable_key)
            .bearer_auth(&tokens.access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let user: AuthUser = response.json().await?;
                Ok(SessionCheck {
                    user: Some(user),
                    refreshed: None,
                })
            }
            // The access token was revoked out from under us; the refresh
            // token may still be good.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => self.refresh(tokens).await,
            status => Err(status_error(status, response).await),
        }
    }

    /// Exchange the refresh token for a new session.
    async fn refresh(&self, tokens: &SessionTokens) -> Result<SessionCheck, IdentityError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/token?grant_type=refresh_token"))
            .header("apikey", &self.inner.publishable_key)
            .json(&serde_json::json!({ "refresh_token": tokens.refresh_token }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let grant: TokenResponse = response.json().await?;
                let user = grant.user.clone();
                Ok(SessionCheck {
                    user: Some(user),
                    refreshed: Some(grant.into_tokens()),
                })
            }
            // An unusable refresh token means the session is simply over.
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Ok(SessionCheck::signed_out())
            }
            status => Err(status_error(status, response).await),
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidCredentials` if the pair is rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(AuthUser, SessionTokens), IdentityError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/token?grant_type=password"))
            .header("apikey", &self.inner.publishable_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let grant: TokenResponse = response.json().await?;
                let user = grant.user.clone();
                Ok((user, grant.into_tokens()))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(IdentityError::InvalidCredentials)
            }
            status => Err(status_error(status, response).await),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Rejected` with the provider's message when the
    /// signup is refused (duplicate email, weak password).
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<AuthUser, IdentityError> {
        let mut body = serde_json::json!({ "email": email, "password": password });
        if let Some(name) = full_name {
            body["data"] = serde_json::json!({ "full_name": name });
        }

        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/signup"))
            .header("apikey", &self.inner.publishable_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            let created: SignUpResponse = response.json().await?;
            return Ok(created.into_user());
        }

        let detail = error_detail(&response.text().await.unwrap_or_default());
        if status.is_client_error() {
            return Err(IdentityError::Rejected(detail));
        }
        Err(IdentityError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    /// Revoke a session at the provider.
    ///
    /// A session that is already gone is not an error; only transport
    /// failures propagate.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Http` if the provider cannot be reached.
    #[instrument(skip(self, tokens))]
    pub async fn sign_out(&self, tokens: &SessionTokens) -> Result<(), IdentityError> {
        self.inner
            .client
            .post(self.endpoint("/auth/v1/logout"))
            .header("apikey", &self.inner.publishable_key)
            .bearer_auth(&tokens.access_token)
            .send()
            .await?;
        Ok(())
    }

}

/// Build a `Status` error, pulling what detail the body offers.
async fn status_error(status: StatusCode, response: reqwest::Response) -> IdentityError {
    let detail = error_detail(&response.text().await.unwrap_or_default());
    IdentityError::Status {
        status: status.as_u16(),
        detail,
    }
}

/// Extract a human-readable message from a provider error body.
///
/// The API is inconsistent about its error shape, so try the known keys
/// before falling back to a truncated raw body.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(detail) = value.get(key).and_then(serde_json::Value::as_str) {
                return detail.to_string();
            }
        }
    }
    body.chars().take(200).collect()
}

// =============================================================================
// Session cookie contract
// =============================================================================

/// Build the session cookie carrying the provider's tokens.
#[must_use]
pub fn session_cookie(tokens: &SessionTokens, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, tokens.to_cookie_value()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .build()
}

/// Build a removal cookie for the session.
#[must_use]
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_known_keys() {
        assert_eq!(
            error_detail(r#"{"error":"invalid_grant","error_description":"Refresh token expired"}"#),
            "Refresh token expired"
        );
        assert_eq!(
            error_detail(r#"{"msg":"User already registered","code":400}"#),
            "User already registered"
        );
    }

    #[test]
    fn test_error_detail_falls_back_to_body() {
        assert_eq!(error_detail("upstream exploded"), "upstream exploded");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let tokens = SessionTokens {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: 1_900_000_000,
        };
        let cookie = session_cookie(&tokens, true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            SessionTokens::from_cookie_value(cookie.value()).unwrap(),
            tokens
        );
    }

    #[test]
    fn test_clear_session_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.value(), "");
    }
}
