//! Signup API route handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::directory::NewDirectoryUser;
use crate::error::{AppError, Result};
use crate::identity::AuthUser;
use crate::state::AppState;

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Signup response body.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: AuthUser,
}

/// Create an account at the identity provider and mirror it into the
/// user directory.
///
/// The mirror insert is best-effort: when it fails, the failure is logged
/// and the signup still succeeds, leaving an identity record with no
/// directory row. The two systems are reconciled by nobody.
///
/// # Errors
///
/// Returns 400 when email or password is missing or the provider rejects
/// the signup, and 500 when the provider is unreachable or unconfigured.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SignupResponse>> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let Some(identity) = state.identity() else {
        return Err(AppError::Internal(
            "authentication service is not configured".to_string(),
        ));
    };

    let user = identity
        .sign_up(email, &request.password, request.full_name.as_deref())
        .await?;

    if let Some(directory) = state.directory() {
        let row = NewDirectoryUser {
            id: user.id,
            email: user.email.clone(),
            full_name: request.full_name.clone(),
            metadata: serde_json::json!({}),
        };
        if let Err(err) = directory.insert(&row).await {
            // The auth record exists but the directory row doesn't; accepted
            // divergence, surfaced in the logs only.
            tracing::error!(error = %err, user_id = %user.id, "failed to mirror user into directory");
        }
    }

    Ok(Json(SignupResponse {
        message: "User created successfully".to_string(),
        user,
    }))
}
