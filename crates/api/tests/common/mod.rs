use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use dropwatch_api::config::ServerConfig;
use dropwatch_api::router::build_app_router;
use dropwatch_api::state::AppState;
use dropwatch_notify::{Mailer, NullMailer};
use dropwatch_provider::http::ProviderConfig;

/// Application secret used to sign test webhook deliveries and link
/// states.
pub const TEST_APP_SECRET: &str = "test-app-secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// The provider API base points at an unroutable local port so any test
/// that accidentally reaches the network fails fast instead of calling
/// out.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        provider: ProviderConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            authorize_url: "http://127.0.0.1:1/oauth2/authorize".to_string(),
            app_key: "test-app-key".to_string(),
            app_secret: TEST_APP_SECRET.to_string(),
            redirect_url: "http://127.0.0.1:1/api/v1/link/callback".to_string(),
        },
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack (CORS, request ID, timeout,
/// tracing, panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone(), Arc::new(NullMailer) as Arc<dyn Mailer>);
    build_app_router(state, &config)
}

/// Issue a GET request against the app.
#[allow(dead_code)]
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a JSON request with the given method and body.
#[allow(dead_code)]
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text.
#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
