//! Account-linking flow: registration and the OAuth callback.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use dropwatch_core::error::CoreError;
use dropwatch_db::repositories::RecipientRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::jobs;
use crate::link_state;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /link`.
#[derive(Debug, Deserialize, Validate)]
pub struct StartLinkRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

/// Response for `POST /link`.
#[derive(Debug, Serialize)]
pub struct StartLinkResponse {
    /// Where to send the user to authorize access.
    pub authorize_url: String,
}

/// Query parameters the provider appends to the OAuth redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/link
///
/// Register an email (idempotent) and hand back the provider
/// authorization URL. The email rides through the flow inside the
/// signed `state` parameter.
pub async fn start_link(
    State(state): State<AppState>,
    Json(input): Json<StartLinkRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let recipient = RecipientRepo::register(&state.pool, &input.email).await?;

    let link_state = link_state::issue(&state.config.provider.app_secret, &recipient.email);
    let authorize_url = state.authorizer.authorize_url(&link_state);

    tracing::info!(email = %recipient.email, "Linking flow started");

    Ok(Json(DataResponse {
        data: StartLinkResponse { authorize_url },
    }))
}

/// GET /api/v1/link/callback
///
/// Complete the OAuth flow: verify the signed state (403 on tamper or
/// expiry), exchange the code for a credential, store it, attach the
/// account to the registration, and kick off the first reconciliation
/// pass so the account's cursor is seeded at "now".
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<impl IntoResponse> {
    let email = link_state::verify(&state.config.provider.app_secret, &params.state)
        .map_err(|e| {
            tracing::warn!(error = %e, "Rejected OAuth callback with invalid state");
            AppError::Core(CoreError::Forbidden("Invalid or expired state".into()))
        })?;

    let grant = state
        .authorizer
        .exchange_code(&params.code)
        .await
        .map_err(|e| AppError::InternalError(format!("Authorization code exchange failed: {e}")))?;

    state
        .token_store
        .set(&grant.account_id, &grant.access_token)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let recipient = RecipientRepo::attach_account(&state.pool, &email, &grant.account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Recipient",
            key: email,
        }))?;

    tracing::info!(
        account_id = %grant.account_id,
        email = %recipient.email,
        "Account linked",
    );

    // First pass seeds the cursor at the feed head, so changes made
    // before linking are never reported.
    jobs::spawn_account_pass(&state, grant.account_id.clone());

    Ok(Json(DataResponse { data: recipient }))
}
