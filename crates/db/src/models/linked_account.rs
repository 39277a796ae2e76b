//! Linked account (stored credential) model.

use dropwatch_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `linked_accounts` table.
///
/// Maps a provider account id to its opaque bearer token. Overwritten on
/// re-authorization; never deleted. The token is never inspected or
/// rotated by this system.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LinkedAccount {
    pub account_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
