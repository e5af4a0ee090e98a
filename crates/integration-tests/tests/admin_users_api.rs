//! Integration tests for the admin-only user API and dashboard mutations.

use reqwest::StatusCode;
use serde_json::Value;

use pressroom_integration_tests::stubs::{self, StubBehavior};
use pressroom_integration_tests::{client, cookie_header, fresh_tokens, spawn, spawn_site};

const ADMIN_EMAIL: &str = "admin@example.com";

async fn spawn_admin(behavior: StubBehavior) -> (String, stubs::Writes) {
    let (stub_router, writes) = stubs::service(behavior);
    let stub_addr = spawn(stub_router).await;
    let site_addr = spawn_site(Some(format!("http://{stub_addr}")), Some(ADMIN_EMAIL)).await;
    (format!("http://{site_addr}"), writes)
}

fn admin_session() -> StubBehavior {
    StubBehavior {
        session_email: Some(ADMIN_EMAIL.to_string()),
        ..StubBehavior::default()
    }
}

// ============================================================================
// Stats
// ============================================================================

#[tokio::test]
async fn stats_requires_a_session() {
    let (base, _writes) = spawn_admin(admin_session()).await;

    let resp = client()
        .get(format!("{base}/api/users/stats"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn stats_rejects_a_non_admin_principal() {
    let (base, _writes) = spawn_admin(StubBehavior {
        session_email: Some("reader@example.com".to_string()),
        ..StubBehavior::default()
    })
    .await;

    let resp = client()
        .get(format!("{base}/api/users/stats"))
        .header("Cookie", cookie_header(&fresh_tokens()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn stats_returns_exact_counts_for_the_fixture_directory() {
    let (base, _writes) = spawn_admin(admin_session()).await;

    let resp = client()
        .get(format!("{base}/api/users/stats"))
        .header("Cookie", cookie_header(&fresh_tokens()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("json body");

    // The stub directory holds 5 users: 3 active, 2 created this month.
    assert_eq!(body["totalUsers"], 5);
    assert_eq!(body["activeUsers"], 3);
    assert_eq!(body["newUsers"], 2);
}

// ============================================================================
// User list
// ============================================================================

#[tokio::test]
async fn list_returns_users_with_exact_total() {
    let (base, _writes) = spawn_admin(admin_session()).await;

    let resp = client()
        .get(format!("{base}/api/users?status=active&sort=email&order=asc"))
        .header("Cookie", cookie_header(&fresh_tokens()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("json body");

    assert_eq!(body["totalCount"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 10);
    let users = body["users"].as_array().expect("users array");
    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|u| u["is_active"] == true));
}

#[tokio::test]
async fn list_requires_the_administrator() {
    let (base, _writes) = spawn_admin(StubBehavior::default()).await;

    let resp = client()
        .get(format!("{base}/api/users"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Dashboard mutations
// ============================================================================

#[tokio::test]
async fn toggle_patches_the_directory_and_redirects_back() {
    let (base, writes) = spawn_admin(admin_session()).await;

    let resp = client()
        .post(format!(
            "{base}/admin/users/00000000-0000-4000-8000-000000000004/toggle"
        ))
        .header("Cookie", cookie_header(&fresh_tokens()))
        .form(&[("active", "true"), ("return_to", "?status=inactive&page=1")])
        .send()
        .await
        .expect("request failed");

    // Mutations re-render the dashboard rather than patching in place.
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");
    assert_eq!(location, "/admin/dashboard?status=inactive&page=1");

    let writes = writes.lock().expect("writes lock");
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0]["method"], "PATCH");
    assert_eq!(
        writes[0]["params"]["id"],
        "eq.00000000-0000-4000-8000-000000000004"
    );
    assert_eq!(writes[0]["body"]["is_active"], true);
}

#[tokio::test]
async fn delete_removes_the_row_and_redirects_back() {
    let (base, writes) = spawn_admin(admin_session()).await;

    let resp = client()
        .post(format!(
            "{base}/admin/users/00000000-0000-4000-8000-000000000005/delete"
        ))
        .header("Cookie", cookie_header(&fresh_tokens()))
        .form(&[("return_to", "")])
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");
    assert_eq!(location, "/admin/dashboard");

    let writes = writes.lock().expect("writes lock");
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0]["method"], "DELETE");
    assert_eq!(
        writes[0]["params"]["id"],
        "eq.00000000-0000-4000-8000-000000000005"
    );
}

// ============================================================================
// Login flow
// ============================================================================

#[tokio::test]
async fn login_sets_the_session_cookie_and_honors_the_redirect() {
    let (base, _writes) = spawn_admin(admin_session()).await;

    let resp = client()
        .post(format!("{base}/admin/login"))
        .form(&[
            ("email", ADMIN_EMAIL),
            ("password", stubs::STUB_PASSWORD),
            ("redirect", "/admin/dashboard"),
        ])
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");
    assert_eq!(location, "/admin/dashboard");

    let set_cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("session cookie");
    assert!(set_cookie.starts_with("pr_session="));
}

#[tokio::test]
async fn login_with_bad_credentials_bounces_back_with_an_error() {
    let (base, _writes) = spawn_admin(admin_session()).await;

    let resp = client()
        .post(format!("{base}/admin/login"))
        .form(&[
            ("email", ADMIN_EMAIL),
            ("password", "wrong-password"),
            ("redirect", "/admin/dashboard"),
        ])
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");
    assert!(location.starts_with("/admin/login?error=1"));
}

#[tokio::test]
async fn logout_clears_the_cookie_and_returns_to_login() {
    let (base, _writes) = spawn_admin(admin_session()).await;

    let resp = client()
        .post(format!("{base}/admin/logout"))
        .header("Cookie", cookie_header(&fresh_tokens()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");
    assert_eq!(location, "/admin/login");

    let set_cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("clearing cookie");
    assert!(set_cookie.starts_with("pr_session=;") || set_cookie.starts_with("pr_session=\"\""));
}
