//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::CATEGORY_ALL;
use crate::filters;
use crate::routes::blog::PostView;
use crate::state::AppState;

/// Landing page query parameters.
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub posts: Vec<PostView>,
    pub categories: Vec<String>,
    pub active_category: String,
    pub search: String,
}

/// Display the landing page with the filtered article grid.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let posts: Vec<PostView> = state
        .catalog()
        .list(query.category.as_deref(), query.search.as_deref())
        .into_iter()
        .map(PostView::from)
        .collect();

    HomeTemplate {
        posts,
        categories: state.catalog().categories(),
        active_category: query
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| CATEGORY_ALL.to_string()),
        search: query.search.unwrap_or_default(),
    }
}
