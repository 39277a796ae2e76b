//! Integration tests for the provider webhook endpoint.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_text, get, TEST_APP_SECRET};
use dropwatch_core::signature::compute_signature;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a signed (or deliberately mis-signed) webhook POST request.
fn webhook_post(body: &str, signature: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header("X-Provider-Signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Challenge echo
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn challenge_is_echoed_verbatim(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/webhook?challenge=abc123-echo-me").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "abc123-echo-me");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn challenge_without_parameter_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/webhook").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Signature validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delivery_with_wrong_signature_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    // A perfectly well-formed body must still be rejected before any
    // account id in it is looked at.
    let body = r#"{"delta":{"users":["dbid:AAA"]}}"#;
    let response = app
        .oneshot(webhook_post(body, &compute_signature("wrong-secret", body.as_bytes())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delivery_without_signature_header_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"delta":{"users":[]}}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signature_is_checked_before_the_body_is_parsed(pool: PgPool) {
    let app = common::build_test_app(pool);

    // Garbage body, garbage signature: the signature failure must win.
    let response = app
        .oneshot(webhook_post("not json at all", "deadbeef"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_signature_with_malformed_body_is_a_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = "not json at all";
    let response = app
        .oneshot(webhook_post(body, &compute_signature(TEST_APP_SECRET, body.as_bytes())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Accepted deliveries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_delivery_is_accepted_immediately_with_empty_body(pool: PgPool) {
    let app = common::build_test_app(pool);

    // The referenced account is not linked; the background pass will
    // fail and be logged, but the webhook response must not care.
    let body = r#"{"delta":{"users":["dbid:NOT-LINKED"]}}"#;
    let response = app
        .oneshot(webhook_post(body, &compute_signature(TEST_APP_SECRET, body.as_bytes())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delivery_with_no_accounts_is_accepted(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = r#"{"delta":{"users":[]}}"#;
    let response = app
        .oneshot(webhook_post(body, &compute_signature(TEST_APP_SECRET, body.as_bytes())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
