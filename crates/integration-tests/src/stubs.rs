//! Stub identity + directory service.
//!
//! One axum router that impersonates the hosted service's `/auth/v1` and
//! `/rest/v1/users` surfaces with deterministic data, so gate and admin
//! flows can be exercised end-to-end without the real provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{any, get, post},
};
use serde_json::{Value, json};

/// Uuid used for every principal the stub issues.
pub const STUB_USER_ID: &str = "7d0f2f9c-41f5-4f7e-9a93-5a4f21d0a8c3";

/// Access token issued when the stub refreshes a session.
pub const ROTATED_ACCESS_TOKEN: &str = "rotated-access-token";

/// Password the stub's password grant accepts.
pub const STUB_PASSWORD: &str = "test-password";

/// How the stub service should behave.
#[derive(Debug, Clone, Default)]
pub struct StubBehavior {
    /// Principal email for session checks, token grants, and refreshes.
    /// `None` means every session is invalid.
    pub session_email: Option<String>,
    /// `/auth/v1/user` answers 500 (provider outage).
    pub user_endpoint_down: bool,
    /// `/auth/v1/signup` rejects with this message.
    pub signup_rejection: Option<String>,
    /// Directory inserts answer 500.
    pub insert_fails: bool,
}

/// Shared handle the stub records directory writes into.
pub type Writes = Arc<Mutex<Vec<Value>>>;

#[derive(Clone)]
struct StubState {
    behavior: StubBehavior,
    writes: Writes,
}

/// Build the stub router; the returned handle records every directory write.
#[must_use]
pub fn service(behavior: StubBehavior) -> (Router, Writes) {
    let writes: Writes = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        behavior,
        writes: Arc::clone(&writes),
    };

    let router = Router::new()
        .route("/auth/v1/user", get(user_endpoint))
        .route("/auth/v1/token", post(token_endpoint))
        .route("/auth/v1/signup", post(signup_endpoint))
        .route("/rest/v1/users", any(users_endpoint))
        .with_state(state);

    (router, writes)
}

fn principal(email: &str) -> Value {
    json!({
        "id": STUB_USER_ID,
        "email": email,
        "user_metadata": {}
    })
}

async fn user_endpoint(State(state): State<StubState>) -> Response {
    if state.behavior.user_endpoint_down {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"msg": "stub outage"})),
        )
            .into_response();
    }

    match &state.behavior.session_email {
        Some(email) => Json(principal(email)).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"msg": "invalid JWT"})),
        )
            .into_response(),
    }
}

async fn token_endpoint(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    let grant_type = params.get("grant_type").map(String::as_str);

    let Some(email) = state.behavior.session_email.clone() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "session revoked"})),
        )
            .into_response();
    };

    // The password grant only accepts the canonical test password.
    if grant_type == Some("password")
        && body.get("password").and_then(Value::as_str) != Some(STUB_PASSWORD)
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "wrong password"})),
        )
            .into_response();
    }

    Json(json!({
        "access_token": ROTATED_ACCESS_TOKEN,
        "refresh_token": "rotated-refresh-token",
        "expires_in": 3600,
        "user": principal(&email)
    }))
    .into_response()
}

async fn signup_endpoint(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    if let Some(message) = &state.behavior.signup_rejection {
        return (StatusCode::BAD_REQUEST, Json(json!({"msg": message}))).into_response();
    }

    let email = body
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or("missing@example.com");

    Json(json!({
        "access_token": "signup-access-token",
        "user": principal(email)
    }))
    .into_response()
}

/// Fixed directory rows: three active users (two created recently), two
/// inactive.
fn directory_rows() -> Vec<Value> {
    let row = |id: u8, email: &str, name: &str, active: bool, created: &str| {
        json!({
            "id": format!("00000000-0000-4000-8000-00000000000{id}"),
            "email": email,
            "full_name": name,
            "is_active": active,
            "created_at": created,
            "metadata": null
        })
    };

    vec![
        row(1, "ada@example.com", "Ada Quinn", true, "2025-07-28T09:15:00Z"),
        row(2, "grace@example.com", "Grace Obi", true, "2025-07-14T18:40:00Z"),
        row(3, "alan@example.com", "Alan Reyes", true, "2025-03-02T11:05:00Z"),
        row(4, "edith@example.com", "Edith Marsh", false, "2025-02-19T08:00:00Z"),
        row(5, "linus@example.com", "Linus Park", false, "2024-12-30T22:10:00Z"),
    ]
}

async fn users_endpoint(
    State(state): State<StubState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    if method == Method::POST || method == Method::PATCH || method == Method::DELETE {
        let recorded = json!({
            "method": method.as_str(),
            "params": params,
            "body": serde_json::from_str::<Value>(&body).unwrap_or(Value::Null),
        });
        if let Ok(mut writes) = state.writes.lock() {
            writes.push(recorded);
        }

        if method == Method::POST && state.behavior.insert_fails {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "stub insert failure"})),
            )
                .into_response();
        }

        return StatusCode::NO_CONTENT.into_response();
    }

    // GET serves both list queries and (via the automatic HEAD mapping)
    // count queries; the count rides in Content-Range either way.
    let rows: Vec<Value> = directory_rows()
        .into_iter()
        .filter(|row| match params.get("is_active").map(String::as_str) {
            Some("eq.true") => row["is_active"] == json!(true),
            Some("eq.false") => row["is_active"] == json!(false),
            _ => true,
        })
        .filter(|row| {
            // Presence of a created_at bound selects the two rows the stub
            // treats as "new this month".
            if params.contains_key("created_at") {
                let created = row["created_at"].as_str().unwrap_or("");
                created >= "2025-07-01"
            } else {
                true
            }
        })
        .collect();

    let total = rows.len();
    let range = if total == 0 {
        format!("*/{total}")
    } else {
        format!("0-{}/{total}", total - 1)
    };

    (StatusCode::OK, [(header::CONTENT_RANGE, range)], Json(rows)).into_response()
}
