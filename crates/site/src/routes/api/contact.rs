//! Contact form route handler.
//!
//! Submissions are validated and logged; there is no outbound mail
//! integration behind this endpoint.

use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// Submit the contact form.
///
/// # Errors
///
/// Returns 400 when a field is missing or the email address is malformed.
#[instrument(skip(form), fields(email = %form.email))]
pub async fn submit(Json(form): Json<ContactForm>) -> Result<Json<ContactResponse>> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() || form.message.trim().is_empty()
    {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }

    let email = form.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    tracing::info!(
        name = %form.name.trim(),
        email = %email,
        "Contact form submission"
    );

    Ok(Json(ContactResponse {
        success: true,
        message: "Thank you for your message! We will get back to you soon.".to_string(),
    }))
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let Some(local) = parts.next() else {
        return false;
    };
    let Some(domain) = parts.next() else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.') && !email.contains(' ')
}
