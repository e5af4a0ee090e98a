//! Client for the remote user directory.
//!
//! The directory is a hosted relational table (`/rest/v1/users`) queried and
//! mutated over a PostgREST-style REST surface. Filters go in the query
//! string (`is_active=eq.true`, `or=(email.ilike.*a*,full_name.ilike.*a*)`),
//! pagination goes in `Range` headers, and exact totals come back in the
//! `Content-Range` header when `Prefer: count=exact` is sent.
//!
//! No caching, no retries: reads are always fresh, failed mutations surface
//! to the caller, and concurrent admin mutations are last-write-wins at the
//! storage layer.

pub mod types;

pub use types::{
    DirectoryUser, NewDirectoryUser, PAGE_SIZE, SortField, SortOrder, StatusFilter, UserPage,
    UserQuery, UserStats,
};

use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveTime, SecondsFormat, TimeZone, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use pressroom_core::UserId;

use crate::config::IdentityConfig;

/// Errors that can occur when talking to the directory API.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an unexpected status.
    #[error("directory API returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// A count query came back without a usable `Content-Range` header.
    #[error("directory response missing exact count")]
    MissingCount,
}

/// Client for the hosted user directory.
#[derive(Clone)]
pub struct DirectoryClient {
    inner: Arc<DirectoryClientInner>,
}

struct DirectoryClientInner {
    client: reqwest::Client,
    users_endpoint: String,
    publishable_key: String,
    service_key: SecretString,
}

impl DirectoryClient {
    /// Create a new directory client.
    ///
    /// The service key authorizes row access the publishable key cannot see;
    /// both are sent the way the hosted service expects.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(DirectoryClientInner {
                client: reqwest::Client::new(),
                users_endpoint: format!("{}/rest/v1/users", config.url),
                publishable_key: config.publishable_key.clone(),
                service_key: config.service_key.clone(),
            }),
        }
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.inner
            .client
            .request(method, &self.inner.users_endpoint)
            .header("apikey", &self.inner.publishable_key)
            .bearer_auth(self.inner.service_key.expose_secret())
    }

    /// Fetch one page of users matching the query, with an exact total.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` on transport failures, unexpected statuses,
    /// or a response without a count.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &UserQuery) -> Result<UserPage, DirectoryError> {
        let mut params: Vec<(&str, String)> = vec![("select", "*".to_string())];
        if let Some(term) = query.search_term() {
            let pattern = format!("*{}*", sanitize_pattern(term));
            params.push((
                "or",
                format!("(email.ilike.{pattern},full_name.ilike.{pattern})"),
            ));
        }
        if let Some(active) = query.status.is_active() {
            params.push(("is_active", format!("eq.{active}")));
        }
        params.push(("order", query.order_clause()));

        let (from, to) = query.range();
        let response = self
            .request(Method::GET)
            .query(&params)
            .header("Range-Unit", "items")
            .header("Range", format!("{from}-{to}"))
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let status = response.status();

        // A range past the last row is how an out-of-range page manifests,
        // not a failure; the total still arrives in Content-Range.
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            let total = content_range_total(&response).unwrap_or(0);
            return Ok(UserPage {
                users: Vec::new(),
                total,
            });
        }

        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let total = content_range_total(&response).ok_or(DirectoryError::MissingCount)?;
        let users: Vec<DirectoryUser> = response.json().await?;

        Ok(UserPage { users, total })
    }

    /// Aggregate counts for the dashboard: total, active, and new since the
    /// first day of the current month (00:00 local time).
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` if any of the three counts fails.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<UserStats, DirectoryError> {
        let total = self.count(&[]).await?;
        let active = self.count(&[("is_active", "eq.true".to_string())]).await?;

        let since = month_start(Local::now()).to_rfc3339_opts(SecondsFormat::Secs, true);
        let new_this_month = self.count(&[("created_at", format!("gte.{since}"))]).await?;

        Ok(UserStats {
            total,
            active,
            new_this_month,
        })
    }

    /// Exact row count for a set of filters, via a body-less HEAD request.
    async fn count(&self, filters: &[(&str, String)]) -> Result<u64, DirectoryError> {
        let mut params: Vec<(&str, String)> = vec![("select", "*".to_string())];
        params.extend_from_slice(filters);

        let response = self
            .request(Method::HEAD)
            .query(&params)
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::RANGE_NOT_SATISFIABLE {
            return Err(status_error(status, response).await);
        }

        content_range_total(&response).ok_or(DirectoryError::MissingCount)
    }

    /// Set a user's `is_active` flag.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` on transport failures or a rejected mutation.
    #[instrument(skip(self))]
    pub async fn set_active(&self, id: UserId, active: bool) -> Result<(), DirectoryError> {
        let response = self
            .request(Method::PATCH)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "is_active": active }))
            .send()
            .await?;

        expect_success(response).await
    }

    /// Delete a user row.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` on transport failures or a rejected mutation.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<(), DirectoryError> {
        let response = self
            .request(Method::DELETE)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .send()
            .await?;

        expect_success(response).await
    }

    /// Insert a mirrored row for a freshly signed-up user.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` on transport failures or a rejected insert.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn insert(&self, user: &NewDirectoryUser) -> Result<(), DirectoryError> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(user)
            .send()
            .await?;

        expect_success(response).await
    }
}

/// Strip the characters that delimit the `or=(...)` filter expression.
fn sanitize_pattern(term: &str) -> String {
    term.chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '"'))
        .collect()
}

/// Pull the exact total out of a `Content-Range` header (`0-9/42` or `*/42`).
fn content_range_total(response: &reqwest::Response) -> Option<u64> {
    let header = response.headers().get("content-range")?.to_str().ok()?;
    parse_content_range_total(header)
}

fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

async fn expect_success(response: reqwest::Response) -> Result<(), DirectoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(status_error(status, response).await)
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> DirectoryError {
    let detail = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect();
    DirectoryError::Status {
        status: status.as_u16(),
        detail,
    }
}

/// First day of the month containing `now`, at 00:00 local time, in UTC.
#[must_use]
pub fn month_start(now: DateTime<Local>) -> DateTime<Utc> {
    let first_day = now
        .date_naive()
        .with_day0(0)
        .unwrap_or_else(|| now.date_naive());
    let midnight = first_day.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or(now)
        .with_timezone(&Utc)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/17"), Some(17));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_sanitize_pattern() {
        assert_eq!(sanitize_pattern("ada"), "ada");
        assert_eq!(sanitize_pattern("a,b(c)\"d"), "abcd");
    }

    #[test]
    fn test_month_start_is_first_midnight_local() {
        let now = Local.with_ymd_and_hms(2025, 8, 15, 13, 45, 12).unwrap();
        let start = month_start(now).with_timezone(&Local);
        assert_eq!(start.year(), 2025);
        assert_eq!(start.month(), 8);
        assert_eq!(start.day(), 1);
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
        assert_eq!(start.second(), 0);
    }

    #[test]
    fn test_month_start_on_the_first() {
        let now = Local.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let start = month_start(now).with_timezone(&Local);
        assert_eq!(start.day(), 1);
        assert_eq!(start.month(), 3);
        assert_eq!(start.hour(), 0);
    }
}
