//! Integration tests for the public posts API.

use reqwest::StatusCode;
use serde_json::Value;

use pressroom_integration_tests::{client, fixture_posts, spawn_site};

async fn spawn_public() -> String {
    let addr = spawn_site(None, None).await;
    format!("http://{addr}")
}

#[tokio::test]
async fn list_returns_every_post_in_original_order() {
    let base = spawn_public().await;

    let resp = client()
        .get(format!("{base}/api/posts"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let posts: Vec<Value> = resp.json().await.expect("json body");
    let slugs: Vec<&str> = posts
        .iter()
        .map(|p| p["slug"].as_str().expect("slug"))
        .collect();
    let expected: Vec<String> = fixture_posts().into_iter().map(|p| p.slug).collect();
    assert_eq!(slugs, expected);
}

#[tokio::test]
async fn all_sentinel_and_empty_search_change_nothing() {
    let base = spawn_public().await;

    let resp = client()
        .get(format!("{base}/api/posts?category=all&search="))
        .send()
        .await
        .expect("request failed");
    let posts: Vec<Value> = resp.json().await.expect("json body");
    assert_eq!(posts.len(), fixture_posts().len());
}

#[tokio::test]
async fn category_filter_is_case_insensitive() {
    let base = spawn_public().await;

    let resp = client()
        .get(format!("{base}/api/posts?category=dEsIgN"))
        .send()
        .await
        .expect("request failed");
    let posts: Vec<Value> = resp.json().await.expect("json body");

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["slug"], "letterpress-revival");
    assert_eq!(posts[0]["category"], "Design");
}

#[tokio::test]
async fn search_finds_a_term_present_only_in_tags() {
    let base = spawn_public().await;

    // "letterpress" appears only in one post's tags
    let resp = client()
        .get(format!("{base}/api/posts?search=LETTERPRESS"))
        .send()
        .await
        .expect("request failed");
    let posts: Vec<Value> = resp.json().await.expect("json body");

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["slug"], "letterpress-revival");
}

#[tokio::test]
async fn search_and_category_filters_compose() {
    let base = spawn_public().await;

    // "performance" matches an Engineering post's tag, but not in Product
    let resp = client()
        .get(format!("{base}/api/posts?category=Product&search=performance"))
        .send()
        .await
        .expect("request failed");
    let posts: Vec<Value> = resp.json().await.expect("json body");
    assert!(posts.is_empty());
}

#[tokio::test]
async fn get_by_slug_round_trips_the_post() {
    let base = spawn_public().await;

    for fixture in fixture_posts() {
        let resp = client()
            .get(format!("{base}/api/posts/{}", fixture.slug))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::OK);

        let post: Value = resp.json().await.expect("json body");
        let expected = serde_json::to_value(&fixture).expect("fixture json");
        assert_eq!(post, expected);
    }
}

#[tokio::test]
async fn unknown_slug_is_404_with_error_body() {
    let base = spawn_public().await;

    let resp = client()
        .get(format!("{base}/api/posts/never-written"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"], "Post not found");
}

#[tokio::test]
async fn landing_page_renders_the_catalog() {
    let base = spawn_public().await;

    let resp = client()
        .get(format!("{base}/"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(body.contains("The Letterpress Revival"));
    assert!(body.contains("Engineering"));
}

#[tokio::test]
async fn post_page_renders_content_and_404s_on_unknown_slug() {
    let base = spawn_public().await;

    let resp = client()
        .get(format!("{base}/blog/letterpress-revival"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("The Letterpress Revival"));

    let resp = client()
        .get(format!("{base}/blog/never-written"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
