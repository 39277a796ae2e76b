//! Feed cursor model.

use dropwatch_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `feed_cursors` table.
///
/// Bookmarks the last-seen position in one account's remote change feed.
/// Advanced after every processed batch; never rewound and never deleted
/// (absence means the account has not been reconciled yet).
#[derive(Debug, Clone, FromRow)]
pub struct FeedCursor {
    pub account_id: String,
    pub cursor: String,
    pub updated_at: Timestamp,
}
