//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (hero, categories, articles, search)
//! GET  /health                 - Health check
//! GET  /blog/{slug}            - Post page
//!
//! # Public API
//! GET  /api/posts              - List posts (category + search filters)
//! GET  /api/posts/{slug}       - Single post
//! POST /api/contact            - Contact form submission
//! POST /api/auth/signup        - Account signup
//!
//! # Admin API (403 unless the caller is the administrator)
//! GET  /api/users/stats        - Aggregate user counts
//! GET  /api/users              - User table query
//!
//! # Admin area (session-gated; login/unauthorized exempt)
//! GET  /admin                  - Redirect to dashboard
//! GET  /admin/login            - Login page
//! POST /admin/login            - Login action
//! POST /admin/logout           - Logout action
//! GET  /admin/unauthorized     - Unauthorized page
//! GET  /admin/dashboard        - Stats + user table
//! POST /admin/users/{id}/toggle - Activate/deactivate a user
//! POST /admin/users/{id}/delete - Delete a user
//! ```

pub mod admin;
pub mod api;
pub mod blog;
pub mod home;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Landing page
        .route("/", get(home::home))
        // Post pages
        .merge(blog::router())
        // JSON API
        .merge(api::router())
        // Admin area
        .merge(admin::router())
}
