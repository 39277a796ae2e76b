//! Repository for the `linked_accounts` table (the durable token store).

use sqlx::PgPool;

use crate::models::linked_account::LinkedAccount;

/// Column list for `linked_accounts` queries.
const COLUMNS: &str = "account_id, access_token, created_at, updated_at";

/// Provides lookups and upserts for stored account credentials.
pub struct LinkedAccountRepo;

impl LinkedAccountRepo {
    /// Fetch the stored credential for an account, if ever linked.
    pub async fn get(
        pool: &PgPool,
        account_id: &str,
    ) -> Result<Option<LinkedAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM linked_accounts WHERE account_id = $1");
        sqlx::query_as::<_, LinkedAccount>(&query)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// Store a credential, overwriting any previous one for the account.
    ///
    /// Re-authorization replaces the token in place; rows are never
    /// deleted.
    pub async fn upsert(
        pool: &PgPool,
        account_id: &str,
        access_token: &str,
    ) -> Result<LinkedAccount, sqlx::Error> {
        let query = format!(
            "INSERT INTO linked_accounts (account_id, access_token) \
             VALUES ($1, $2) \
             ON CONFLICT (account_id) DO UPDATE SET \
                access_token = EXCLUDED.access_token, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LinkedAccount>(&query)
            .bind(account_id)
            .bind(access_token)
            .fetch_one(pool)
            .await
    }
}
