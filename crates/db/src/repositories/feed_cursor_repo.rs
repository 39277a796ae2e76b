//! Repository for the `feed_cursors` table (the durable cursor store).

use sqlx::PgPool;

use crate::models::feed_cursor::FeedCursor;

/// Column list for `feed_cursors` queries.
const COLUMNS: &str = "account_id, cursor, updated_at";

/// Provides lookups and upserts for per-account feed cursors.
///
/// Writes are last-writer-wins per account id; serialization of
/// concurrent reconciliation passes is the reconciler's concern, not
/// the store's.
pub struct FeedCursorRepo;

impl FeedCursorRepo {
    /// Fetch the persisted cursor for an account, if one exists.
    pub async fn get(pool: &PgPool, account_id: &str) -> Result<Option<FeedCursor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feed_cursors WHERE account_id = $1");
        sqlx::query_as::<_, FeedCursor>(&query)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// Persist a cursor, overwriting any previous position.
    pub async fn set(pool: &PgPool, account_id: &str, cursor: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO feed_cursors (account_id, cursor) \
             VALUES ($1, $2) \
             ON CONFLICT (account_id) DO UPDATE SET \
                cursor = EXCLUDED.cursor, \
                updated_at = NOW()",
        )
        .bind(account_id)
        .bind(cursor)
        .execute(pool)
        .await?;
        Ok(())
    }
}
