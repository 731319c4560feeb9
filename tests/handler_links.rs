//! HTTP tests for the authenticated link management endpoints.

mod common;

use axum::{Router, middleware};
use axum_test::TestServer;
use linkvault::api::middleware::auth;
use linkvault::api::routes::protected_routes;
use linkvault::infrastructure::store::DocumentStore;
use serde_json::{Value, json};

use common::{OWNER_TOKEN, TestContext, create_test_state};

fn server(ctx: &TestContext) -> TestServer {
    let api = protected_routes()
        .route_layer(middleware::from_fn_with_state(ctx.state.clone(), auth::layer));

    let app = Router::new().nest("/api", api).with_state(ctx.state.clone());
    TestServer::new(app).unwrap()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn test_links_require_a_bearer_token() {
    let ctx = create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    // Missing Authorization header is rejected by the extractor.
    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_links_reject_unknown_token() {
    let ctx = create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/api/links")
        .add_header("Authorization", bearer("bogus"))
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_create_link_returns_short_url() {
    let ctx = create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/api/links")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "url": "https://example.com/page" }))
        .await;

    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    let slug = body["slug"].as_str().unwrap();
    assert_eq!(slug.len(), 6);
    assert_eq!(
        body["short_url"],
        format!("https://lv.example.com/go?slug={slug}")
    );
    assert_eq!(body["destination_url"], "https://example.com/page");

    // The stored record exists and is owned by the session account.
    let record = ctx
        .store
        .read(&format!("links/{slug}"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record["ownerId"], "user-1");
}

#[tokio::test]
async fn test_create_link_with_custom_slug_and_conflict() {
    let ctx = create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/api/links")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "url": "https://example.com", "custom_slug": "my-page" }))
        .await;
    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    assert_eq!(body["slug"], "my-page");

    let response = server
        .post("/api/links")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "url": "https://example.com/other", "custom_slug": "my-page" }))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_create_link_validates_url() {
    let ctx = create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/api/links")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "url": "not-a-url" }))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_list_links_returns_decrypted_destinations() {
    let ctx = create_test_state();
    let server = server(&ctx);

    server
        .post("/api/links")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "url": "https://example.com/listed", "max_clicks": 5 }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .get("/api/links")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .await;

    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["destination_url"], "https://example.com/listed");
    assert_eq!(body["items"][0]["clicks"], 0);
    assert_eq!(body["items"][0]["max_clicks"], 5);
}

#[tokio::test]
async fn test_delete_link_removes_record() {
    let ctx = create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/api/links")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "url": "https://example.com" }))
        .await;
    let body: Value = response.json();
    let slug = body["slug"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/api/links/{slug}"))
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 204);

    assert!(
        ctx.store
            .read(&format!("links/{slug}"))
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        ctx.store
            .read(&format!("users/user-1/links/{slug}"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_delete_refuses_foreign_links() {
    let ctx = create_test_state();
    ctx.directory.seed_session("token-user-2", "user-2", "two@example.com");
    let server = server(&ctx);

    let response = server
        .post("/api/links")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "url": "https://example.com" }))
        .await;
    let body: Value = response.json();
    let slug = body["slug"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/api/links/{slug}"))
        .add_header("Authorization", bearer("token-user-2"))
        .await;
    assert_eq!(response.status_code(), 403);

    // The record is still there.
    assert!(
        ctx.store
            .read(&format!("links/{slug}"))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_delete_unknown_slug_is_not_found() {
    let ctx = create_test_state();
    let server = server(&ctx);

    let response = server
        .delete("/api/links/nosuch")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .await;

    assert_eq!(response.status_code(), 404);
}
