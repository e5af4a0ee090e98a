//! JSON API route handlers.

pub mod contact;
pub mod posts;
pub mod signup;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the JSON API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(posts::list))
        .route("/api/posts/{slug}", get(posts::show))
        .route("/api/contact", post(contact::submit))
        .route("/api/auth/signup", post(signup::signup))
        .route("/api/users/stats", get(users::stats))
        .route("/api/users", get(users::list))
}
