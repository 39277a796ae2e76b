pub mod alerts;
pub mod health;
pub mod link;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /link                POST  register email, start OAuth flow
/// /link/callback       GET   OAuth completion
///
/// /alerts              GET   list registrations
/// /alerts/{email}      PUT   toggle alert preference
/// ```
///
/// The webhook endpoint is mounted at the root (`/webhook`), not under
/// `/api/v1`, because its URL is registered with the provider.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(link::router())
        .merge(alerts::router())
}
