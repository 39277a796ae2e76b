//! Background reconcile-and-notify passes.
//!
//! Webhook intake and the OAuth callback both hand accounts to
//! [`spawn_account_pass`]; the HTTP response never waits for the pass.
//! Tasks run on the [`TaskTracker`](tokio_util::task::TaskTracker) in
//! app state so shutdown can drain them. Failures are contained here:
//! they are logged and the pass is abandoned until the provider's next
//! webhook delivery, which resumes from the last persisted cursor.

use dropwatch_provider::ProviderError;
use dropwatch_reconcile::{ReconcileError, StoreError};

use crate::state::AppState;

/// Error type for one reconcile-and-notify pass.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Launch one background pass for `account_id` without waiting for it.
pub fn spawn_account_pass(state: &AppState, account_id: String) {
    let state = state.clone();
    state.jobs.clone().spawn(async move {
        if let Err(e) = run_account_pass(&state, &account_id).await {
            tracing::error!(account_id, error = %e, "Account pass failed");
        }
    });
}

/// Reconcile one account and notify its recipients if anything changed.
///
/// The dispatcher is not invoked at all for an empty summary.
pub async fn run_account_pass(state: &AppState, account_id: &str) -> Result<(), PassError> {
    let summary = state.reconciler.reconcile(account_id).await?;

    if summary.is_empty() {
        tracing::debug!(account_id, "No changes, skipping notification");
        return Ok(());
    }

    let token = state.token_store.get(account_id).await?;
    let display_name = state.profile.display_name(&token).await?;

    let sent = state
        .dispatcher
        .dispatch(account_id, &display_name, &summary)
        .await?;

    tracing::info!(
        account_id,
        changes = summary.len(),
        sent,
        "Account pass complete",
    );
    Ok(())
}
