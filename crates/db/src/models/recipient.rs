//! Recipient registration models and DTOs.

use dropwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `recipients` table.
///
/// An email's subscription to change alerts. `account_id` is NULL until
/// the OAuth flow completes; several rows may share one `account_id`
/// (a shared account alerting multiple addresses).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recipient {
    pub id: DbId,
    pub email: String,
    pub account_id: Option<String>,
    pub alert_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for toggling a recipient's alert preference.
#[derive(Debug, Deserialize)]
pub struct UpdateAlertPreference {
    pub alert_enabled: bool,
}
