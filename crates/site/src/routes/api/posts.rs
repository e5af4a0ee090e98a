//! Posts API route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::Post;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Posts list query parameters.
#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// List posts matching the category and search filters.
///
/// `category=all` (any casing) or an absent category means no category
/// filter; an empty search means no search filter. Results keep the
/// catalog's original order.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Json<Vec<Post>> {
    let posts: Vec<Post> = state
        .catalog()
        .list(query.category.as_deref(), query.search.as_deref())
        .into_iter()
        .cloned()
        .collect();

    Json(posts)
}

/// Fetch a single post by slug.
///
/// # Errors
///
/// Returns 404 with `{"error": "Post not found"}` for an unknown slug.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Post>> {
    state
        .catalog()
        .get_by_slug(&slug)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}
