//! Post page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::instrument;

use crate::catalog::{Post, render_markdown};
use crate::filters;
use crate::state::AppState;

/// Post view for templates.
#[derive(Debug, Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub category: String,
    pub author: String,
    pub date: String,
    pub read_time: String,
    pub tags: Vec<String>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            category: post.category.clone(),
            author: post.author.clone(),
            date: post.date.format("%b %d, %Y").to_string(),
            read_time: post.read_time.clone(),
            tags: post.tags.clone(),
        }
    }
}

/// Post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub post: PostView,
    pub content_html: String,
    pub recent_posts: Vec<PostView>,
}

/// Number of recent posts to show below an article.
const RECENT_POSTS_COUNT: usize = 3;

/// Display a single post by slug.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let post = state
        .catalog()
        .get_by_slug(&slug)
        .ok_or(StatusCode::NOT_FOUND)?;

    let content_html = render_markdown(&post.content);

    let recent_posts: Vec<PostView> = state
        .catalog()
        .recent(RECENT_POSTS_COUNT, Some(&slug))
        .into_iter()
        .map(PostView::from)
        .collect();

    Ok(BlogShowTemplate {
        post: PostView::from(post),
        content_html,
        recent_posts,
    })
}

/// Create the post page routes router.
pub fn router() -> Router<AppState> {
    Router::new().route("/blog/{slug}", get(show))
}
