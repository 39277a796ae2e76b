//! Repository for the `recipients` table.

use sqlx::PgPool;

use crate::models::recipient::Recipient;

/// Column list for `recipients` queries.
const COLUMNS: &str = "id, email, account_id, alert_enabled, created_at, updated_at";

/// Provides CRUD operations for recipient registrations.
pub struct RecipientRepo;

impl RecipientRepo {
    /// Register an email, or return the existing registration unchanged.
    ///
    /// Uses `INSERT ... ON CONFLICT (email) DO UPDATE` so the row is
    /// returned in a single round-trip whether or not it already existed.
    /// An existing row keeps its `account_id` and `alert_enabled` state.
    pub async fn register(pool: &PgPool, email: &str) -> Result<Recipient, sqlx::Error> {
        let query = format!(
            "INSERT INTO recipients (email) \
             VALUES ($1) \
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recipient>(&query)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Find a registration by email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Recipient>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipients WHERE email = $1");
        sqlx::query_as::<_, Recipient>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List every registration, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Recipient>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipients ORDER BY id");
        sqlx::query_as::<_, Recipient>(&query).fetch_all(pool).await
    }

    /// List every registration attached to one provider account.
    pub async fn list_for_account(
        pool: &PgPool,
        account_id: &str,
    ) -> Result<Vec<Recipient>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipients WHERE account_id = $1 ORDER BY id");
        sqlx::query_as::<_, Recipient>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Attach a provider account to a registration after OAuth completes,
    /// enabling alerts at the same time.
    ///
    /// Returns `None` if no registration exists for `email`.
    pub async fn attach_account(
        pool: &PgPool,
        email: &str,
        account_id: &str,
    ) -> Result<Option<Recipient>, sqlx::Error> {
        let query = format!(
            "UPDATE recipients \
             SET account_id = $2, alert_enabled = true, updated_at = NOW() \
             WHERE email = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recipient>(&query)
            .bind(email)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// Toggle the alert preference for one email.
    ///
    /// Returns `None` if no registration exists for `email`.
    pub async fn set_alert_enabled(
        pool: &PgPool,
        email: &str,
        enabled: bool,
    ) -> Result<Option<Recipient>, sqlx::Error> {
        let query = format!(
            "UPDATE recipients \
             SET alert_enabled = $2, updated_at = NOW() \
             WHERE email = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recipient>(&query)
            .bind(email)
            .bind(enabled)
            .fetch_optional(pool)
            .await
    }
}
