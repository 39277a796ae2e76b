//! Webhook intake: provider endpoint verification and change
//! notifications.
//!
//! The provider retries deliveries on its own schedule and offers no
//! ordering or exactly-once guarantee, so the POST handler does the
//! minimum synchronously: verify the signature, pull out the account
//! ids, launch one background pass each, and return.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use dropwatch_core::error::CoreError;
use dropwatch_core::signature;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::jobs;
use crate::state::AppState;

/// Header carrying the provider's HMAC-SHA256 hex signature.
const SIGNATURE_HEADER: &str = "X-Provider-Signature";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for the GET verification request.
#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub challenge: String,
}

/// Body of a change-notification delivery.
#[derive(Debug, Deserialize)]
struct WebhookPayload {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    users: Vec<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /webhook
///
/// Echo the `challenge` query parameter verbatim so the provider can
/// verify the endpoint.
pub async fn challenge(Query(params): Query<ChallengeQuery>) -> String {
    params.challenge
}

/// POST /webhook
///
/// Verify the delivery signature against the raw body, then start one
/// background reconcile-and-notify pass per notified account id. The
/// response is sent immediately; it never waits for the passes.
///
/// Fails closed: a missing or mismatched signature rejects the delivery
/// before any account id is read from the body.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !signature::verify_signature(&state.config.provider.app_secret, &body, provided) {
        tracing::warn!("Rejected webhook delivery with missing or invalid signature");
        return Err(AppError::Core(CoreError::Forbidden(
            "Webhook signature mismatch".into(),
        )));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook body: {e}")))?;

    tracing::info!(
        accounts = payload.delta.users.len(),
        "Webhook delivery accepted",
    );

    for account_id in payload.delta.users {
        jobs::spawn_account_pass(&state, account_id);
    }

    Ok(StatusCode::OK)
}
