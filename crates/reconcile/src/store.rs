//! Durable key-value contracts for credentials and feed cursors.
//!
//! Both stores are injected interfaces rather than process-global state:
//! production uses the PostgreSQL-backed implementations below, tests
//! use in-memory fakes. Writes are last-writer-wins per account id.

use async_trait::async_trait;
use dropwatch_db::repositories::{FeedCursorRepo, LinkedAccountRepo};
use dropwatch_db::DbPool;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for store lookups and writes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Credential lookup for an account that was never linked.
    #[error("No stored credential for account {account_id}")]
    MissingCredential { account_id: String },

    /// The backing storage engine failed.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Durable mapping from account id to authorization credential.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Fetch the credential for an account.
    ///
    /// Fails with [`StoreError::MissingCredential`] if the account was
    /// never linked.
    async fn get(&self, account_id: &str) -> Result<String, StoreError>;

    /// Store a credential, overwriting any previous one.
    async fn set(&self, account_id: &str, credential: &str) -> Result<(), StoreError>;
}

/// Durable mapping from account id to feed cursor.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Fetch the persisted cursor; `None` means the account has never
    /// completed a reconciliation batch.
    async fn get(&self, account_id: &str) -> Result<Option<String>, StoreError>;

    /// Persist a cursor, overwriting the previous position.
    async fn set(&self, account_id: &str, cursor: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL implementations
// ---------------------------------------------------------------------------

/// [`TokenStore`] over the `linked_accounts` table.
pub struct PgTokenStore {
    pool: DbPool,
}

impl PgTokenStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn get(&self, account_id: &str) -> Result<String, StoreError> {
        let row = LinkedAccountRepo::get(&self.pool, account_id).await?;
        match row {
            Some(account) => Ok(account.access_token),
            None => Err(StoreError::MissingCredential {
                account_id: account_id.to_string(),
            }),
        }
    }

    async fn set(&self, account_id: &str, credential: &str) -> Result<(), StoreError> {
        LinkedAccountRepo::upsert(&self.pool, account_id, credential).await?;
        Ok(())
    }
}

/// [`CursorStore`] over the `feed_cursors` table.
pub struct PgCursorStore {
    pool: DbPool,
}

impl PgCursorStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CursorStore for PgCursorStore {
    async fn get(&self, account_id: &str) -> Result<Option<String>, StoreError> {
        let row = FeedCursorRepo::get(&self.pool, account_id).await?;
        Ok(row.map(|c| c.cursor))
    }

    async fn set(&self, account_id: &str, cursor: &str) -> Result<(), StoreError> {
        FeedCursorRepo::set(&self.pool, account_id, cursor).await?;
        Ok(())
    }
}
