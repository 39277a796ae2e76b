//! Route definitions for the account-linking flow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::link;
use crate::state::AppState;

/// Routes mounted at `/link`.
///
/// ```text
/// POST /link           -> start_link
/// GET  /link/callback  -> oauth_callback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/link", post(link::start_link))
        .route("/link/callback", get(link::oauth_callback))
}
