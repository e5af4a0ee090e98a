//! Shared harness for Pressroom integration tests.
//!
//! Tests spawn the real site router on an ephemeral port, with the identity
//! and directory services replaced by stub axum routers spawned the same
//! way. Nothing leaves the machine and no test needs credentials.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod stubs;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use chrono::{NaiveDate, Utc};
use secrecy::SecretString;

use pressroom_core::Email;
use pressroom_site::catalog::{Post, PostCatalog};
use pressroom_site::config::{IdentityConfig, SiteConfig};
use pressroom_site::identity::{SESSION_COOKIE, SessionTokens};
use pressroom_site::state::AppState;

/// Spawn any router on an ephemeral local port.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server error");
    });

    addr
}

/// Spawn the site with the given service base URL and admin email.
///
/// `service_url: None` leaves the identity block unconfigured, which is the
/// fail-open scenario.
pub async fn spawn_site(service_url: Option<String>, admin_email: Option<&str>) -> SocketAddr {
    let config = site_config(service_url, admin_email);
    let state = AppState::new(config, PostCatalog::from_posts(fixture_posts()));
    spawn(pressroom_site::app(state)).await
}

/// Build a test configuration.
#[must_use]
pub fn site_config(service_url: Option<String>, admin_email: Option<&str>) -> SiteConfig {
    SiteConfig {
        host: "127.0.0.1".parse().expect("host"),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        content_dir: PathBuf::from("unused"),
        identity: service_url.map(|url| IdentityConfig {
            url,
            publishable_key: "pk_test_integration".to_string(),
            service_key: SecretString::from("pk_test_integration"),
        }),
        admin_email: admin_email.map(|e| Email::parse(e).expect("admin email")),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// An HTTP client that never follows redirects, so gate decisions stay
/// observable.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Session tokens whose access token is still valid.
#[must_use]
pub fn fresh_tokens() -> SessionTokens {
    SessionTokens {
        access_token: "test-access-token".to_string(),
        refresh_token: "test-refresh-token".to_string(),
        expires_at: Utc::now().timestamp() + 3600,
    }
}

/// Session tokens whose access token has expired.
#[must_use]
pub fn expired_tokens() -> SessionTokens {
    SessionTokens {
        access_token: "stale-access-token".to_string(),
        refresh_token: "test-refresh-token".to_string(),
        expires_at: Utc::now().timestamp() - 60,
    }
}

/// A `Cookie` header value carrying the given session.
#[must_use]
pub fn cookie_header(tokens: &SessionTokens) -> String {
    format!("{SESSION_COOKIE}={}", tokens.to_cookie_value())
}

/// The fixture catalog every spawned site serves.
#[must_use]
pub fn fixture_posts() -> Vec<Post> {
    vec![
        Post {
            slug: "letterpress-revival".to_string(),
            title: "The Letterpress Revival".to_string(),
            excerpt: "Why physical type is teaching digital designers restraint.".to_string(),
            content: "Ink, pressure, and paper force choices screens never do.".to_string(),
            category: "Design".to_string(),
            author: "Mara Ellison".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, 2).expect("date"),
            read_time: "5 min read".to_string(),
            tags: vec!["letterpress".to_string(), "craft".to_string()],
        },
        Post {
            slug: "profiling-before-guessing".to_string(),
            title: "Profiling Before Guessing".to_string(),
            excerpt: "Every performance hunch we had last quarter was wrong.".to_string(),
            content: "The profiler embarrassed us five times in a row.".to_string(),
            category: "Engineering".to_string(),
            author: "Dev Okafor".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 18).expect("date"),
            read_time: "7 min read".to_string(),
            tags: vec!["performance".to_string(), "tooling".to_string()],
        },
        Post {
            slug: "pricing-page-archaeology".to_string(),
            title: "Pricing Page Archaeology".to_string(),
            excerpt: "Six years of pricing pages, and what each layer says about us.".to_string(),
            content: "Old pricing pages are strata; dig and you find old strategy.".to_string(),
            category: "Product".to_string(),
            author: "June Castellanos".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 3).expect("date"),
            read_time: "4 min read".to_string(),
            tags: vec!["pricing".to_string(), "strategy".to_string()],
        },
    ]
}
