//! Wire types for the hosted identity API.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use pressroom_core::{Email, UserId};

/// Leeway subtracted from the token expiry when deciding whether to refresh,
/// so a token never expires mid-request.
const EXPIRY_LEEWAY_SECONDS: i64 = 30;

/// The session issued by the identity provider.
///
/// The provider owns the whole lifecycle; the site only carries these tokens
/// between the browser cookie and the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) when the access token expires.
    pub expires_at: i64,
}

impl SessionTokens {
    /// Whether the access token is expired (or about to expire).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= chrono::Utc::now().timestamp() + EXPIRY_LEEWAY_SECONDS
    }

    /// Encode the tokens into a cookie-safe value.
    #[must_use]
    pub fn to_cookie_value(&self) -> String {
        // Serializing a struct with no non-string members cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode tokens from a cookie value.
    ///
    /// Returns `None` for anything malformed; a garbled cookie is treated the
    /// same as no session.
    #[must_use]
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// The authenticated principal as the provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<serde_json::Value>,
}

/// Result of a per-request session check.
///
/// `refreshed` carries new tokens when the provider rotated the session; the
/// gate must re-set the cookie so the browser keeps the fresh token.
#[derive(Debug, Clone)]
pub struct SessionCheck {
    pub user: Option<AuthUser>,
    pub refreshed: Option<SessionTokens>,
}

impl SessionCheck {
    /// A check that found no valid session.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            user: None,
            refreshed: None,
        }
    }
}

/// Token grant response (`password` and `refresh_token` grants).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl TokenResponse {
    /// Convert the grant response into session tokens.
    #[must_use]
    pub fn into_tokens(self) -> SessionTokens {
        let expires_at = self.expires_at.unwrap_or_else(|| {
            chrono::Utc::now().timestamp() + self.expires_in.unwrap_or(3600)
        });
        SessionTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Signup response.
///
/// The provider returns a full session when auto-confirm is on, and a bare
/// user record when email confirmation is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session { user: AuthUser },
    User(AuthUser),
}

impl SignUpResponse {
    /// The created user, whichever shape the provider chose.
    #[must_use]
    pub fn into_user(self) -> AuthUser {
        match self {
            Self::Session { user } | Self::User(user) => user,
        }
    }
}
