//! Route definitions for the `/alerts` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET /alerts          -> list_alerts
/// PUT /alerts/{email}  -> set_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(alerts::list_alerts))
        .route("/alerts/{email}", put(alerts::set_alert))
}
