//! Post catalog backed by a JSON dataset.
//!
//! This module loads `posts.json` from the content directory at startup and
//! holds the posts in memory for the lifetime of the process. Posts are
//! immutable: there is no create/update/delete path anywhere in the site.
//!
//! Filtering preserves the original file order, so "no filter" returns the
//! dataset exactly as authored.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use serde::{Deserialize, Serialize};

/// Sentinel category value meaning "no category filter".
pub const CATEGORY_ALL: &str = "all";

/// A published post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub date: NaiveDate,
    #[serde(rename = "readTime")]
    pub read_time: String,
    pub tags: Vec<String>,
}

impl Post {
    /// Whether the post matches a free-text search term.
    ///
    /// Case-insensitive substring match over title, excerpt, content, and
    /// every tag.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.excerpt.to_lowercase().contains(&term)
            || self.content.to_lowercase().contains(&term)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&term))
    }
}

/// Catalog that holds all posts in memory.
#[derive(Debug, Clone)]
pub struct PostCatalog {
    posts: Arc<Vec<Post>>,
}

impl PostCatalog {
    /// Load the catalog from `posts.json` in the content directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(content_dir: &Path) -> Result<Self, CatalogError> {
        let path = content_dir.join("posts.json");
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        let posts: Vec<Post> =
            serde_json::from_str(&raw).map_err(|e| CatalogError::Parse(e.to_string()))?;

        tracing::info!(count = posts.len(), path = %path.display(), "Loaded post catalog");

        Ok(Self::from_posts(posts))
    }

    /// Build a catalog directly from a list of posts.
    #[must_use]
    pub fn from_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Arc::new(posts),
        }
    }

    /// All posts in original order.
    #[must_use]
    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    /// List posts matching a category and a search term, in original order.
    ///
    /// The category filter is case-insensitive equality; the sentinel `all`
    /// (any casing), an empty string, or `None` means no filter. The search
    /// filter is a case-insensitive substring match over title, excerpt,
    /// content, and tags; empty or `None` means no filter.
    #[must_use]
    pub fn list(&self, category: Option<&str>, search: Option<&str>) -> Vec<&Post> {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(CATEGORY_ALL));
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        self.posts
            .iter()
            .filter(|post| category.is_none_or(|c| post.category.eq_ignore_ascii_case(c)))
            .filter(|post| search.is_none_or(|s| post.matches_search(s)))
            .collect()
    }

    /// Get a post by slug.
    #[must_use]
    pub fn get_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// All unique category names, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for post in self.posts.iter() {
            if !categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&post.category))
            {
                categories.push(post.category.clone());
            }
        }
        categories
    }

    /// Recent posts in catalog order, optionally excluding a specific slug.
    #[must_use]
    pub fn recent(&self, limit: usize, exclude_slug: Option<&str>) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|p| exclude_slug.is_none_or(|s| p.slug != s))
            .take(limit)
            .collect()
    }
}

/// Render post content to HTML with GitHub Flavored Markdown support.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    markdown_to_html(content, &options)
}

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}
