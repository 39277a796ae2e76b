//! Route definitions for the provider webhook endpoint.

use axum::routing::get;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Routes mounted at the root.
///
/// ```text
/// GET  /webhook  -> challenge (endpoint verification echo)
/// POST /webhook  -> receive   (signed change notification)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", get(webhook::challenge).post(webhook::receive))
}
