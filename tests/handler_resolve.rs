//! HTTP tests for the resolve and unlock endpoints.

mod common;

use axum::Router;
use axum::routing::{get, post};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use linkvault::api::handlers::{resolve_handler, unlock_handler};
use linkvault::application::services::NewLinkSpec;
use linkvault::infrastructure::store::DocumentStore;
use serde_json::{Value, json};

use common::{TestContext, click_count, create_test_state, seed_link, spec};

fn server(ctx: &TestContext) -> TestServer {
    let app = Router::new()
        .route("/go", get(resolve_handler))
        .route("/go/{slug}", post(unlock_handler))
        .with_state(ctx.state.clone());

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_resolve_redirects_to_destination() {
    let ctx = create_test_state();
    let slug = seed_link(&ctx, spec("https://example.com/target")).await;
    let server = server(&ctx);

    let response = server.get(&format!("/go?slug={slug}")).await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/target");
    assert_eq!(click_count(&ctx, &slug).await, 1);
}

#[tokio::test]
async fn test_resolve_without_slug_parameter() {
    let ctx = create_test_state();
    let server = server(&ctx);

    let response = server.get("/go").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_resolve_unknown_slug() {
    let ctx = create_test_state();
    let server = server(&ctx);

    let response = server.get("/go?slug=nosuch").await;
    response.assert_status_not_found();

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_resolve_expired_link_is_gone() {
    let ctx = create_test_state();
    let slug = seed_link(
        &ctx,
        NewLinkSpec {
            expires_at: Some(Utc::now() - Duration::hours(1)),
            ..spec("https://example.com")
        },
    )
    .await;
    let server = server(&ctx);

    let response = server.get(&format!("/go?slug={slug}")).await;

    assert_eq!(response.status_code(), 410);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"]["reason"], "expired");
}

#[tokio::test]
async fn test_resolve_exhausted_quota_is_gone() {
    let ctx = create_test_state();
    let slug = seed_link(
        &ctx,
        NewLinkSpec {
            max_clicks: Some(1),
            ..spec("https://example.com")
        },
    )
    .await;
    let server = server(&ctx);

    assert_eq!(server.get(&format!("/go?slug={slug}")).await.status_code(), 307);

    let response = server.get(&format!("/go?slug={slug}")).await;
    assert_eq!(response.status_code(), 410);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"]["reason"], "quota_exceeded");
}

#[tokio::test]
async fn test_protected_link_asks_for_password() {
    let ctx = create_test_state();
    let slug = seed_link(
        &ctx,
        NewLinkSpec {
            password: Some("Secr3tPass".to_string()),
            ..spec("https://example.com")
        },
    )
    .await;
    let server = server(&ctx);

    let response = server.get(&format!("/go?slug={slug}")).await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "password_required");
    assert_eq!(click_count(&ctx, &slug).await, 0);
}

#[tokio::test]
async fn test_unlock_with_wrong_then_correct_password() {
    let ctx = create_test_state();
    let slug = seed_link(
        &ctx,
        NewLinkSpec {
            password: Some("Secr3tPass".to_string()),
            ..spec("https://example.com/secret")
        },
    )
    .await;
    let server = server(&ctx);

    // Wrong attempt: rejected, retryable, nothing recorded.
    let response = server
        .post(&format!("/go/{slug}"))
        .json(&json!({ "password": "wrong" }))
        .await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(click_count(&ctx, &slug).await, 0);

    // Correct attempt resolves and records the click.
    let response = server
        .post(&format!("/go/{slug}"))
        .json(&json!({ "password": "Secr3tPass" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["destination_url"], "https://example.com/secret");
    assert_eq!(click_count(&ctx, &slug).await, 1);
}

#[tokio::test]
async fn test_unlock_of_unprotected_link_just_resolves() {
    let ctx = create_test_state();
    let slug = seed_link(&ctx, spec("https://example.com/open")).await;
    let server = server(&ctx);

    let response = server
        .post(&format!("/go/{slug}"))
        .json(&json!({ "password": "ignored" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["destination_url"], "https://example.com/open");
}

#[tokio::test]
async fn test_corrupted_payload_is_unprocessable() {
    let ctx = create_test_state();
    let slug = seed_link(&ctx, spec("https://example.com")).await;

    ctx.store
        .write(
            &format!("links/{slug}/encryptedPayload"),
            json!("AAAAAAAAAAAAAAAAAAAAAA=="),
        )
        .await
        .unwrap();

    let server = server(&ctx);
    let response = server.get(&format!("/go?slug={slug}")).await;

    assert_eq!(response.status_code(), 422);

    // The body must not reveal which sub-check failed.
    let body: Value = response.json();
    let message = body["error"]["message"].as_str().unwrap().to_lowercase();
    assert!(!message.contains("key"));
    assert!(!message.contains("password"));
}
