//! Handlers for the `/alerts` resource (per-recipient alert preference).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use dropwatch_core::error::CoreError;
use dropwatch_db::models::recipient::UpdateAlertPreference;
use dropwatch_db::repositories::RecipientRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/alerts
///
/// List every recipient registration and its alert preference.
pub async fn list_alerts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let recipients = RecipientRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: recipients }))
}

/// PUT /api/v1/alerts/{email}
///
/// Toggle the alert preference for one email. 404 for an email that was
/// never registered.
pub async fn set_alert(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(input): Json<UpdateAlertPreference>,
) -> AppResult<impl IntoResponse> {
    let updated = RecipientRepo::set_alert_enabled(&state.pool, &email, input.alert_enabled)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Recipient",
            key: email,
        }))?;

    tracing::info!(
        email = %updated.email,
        alert_enabled = updated.alert_enabled,
        "Alert preference updated",
    );

    Ok(Json(DataResponse { data: updated }))
}
