use std::sync::Arc;

use dropwatch_notify::{Dispatcher, Mailer};
use dropwatch_provider::{AccountProfile, Authorizer, ChangeFeed, HttpProviderClient};
use dropwatch_reconcile::{CursorStore, PgCursorStore, PgTokenStore, Reconciler, TokenStore};
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: dropwatch_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Change reconciliation engine.
    pub reconciler: Arc<Reconciler>,
    /// Alert email fan-out.
    pub dispatcher: Arc<Dispatcher>,
    /// Credential store (also consulted for profile lookups).
    pub token_store: Arc<dyn TokenStore>,
    /// Account-profile API client.
    pub profile: Arc<dyn AccountProfile>,
    /// OAuth authorization-service client.
    pub authorizer: Arc<dyn Authorizer>,
    /// Tracker for in-flight background reconciliation passes, drained
    /// on graceful shutdown.
    pub jobs: TaskTracker,
}

impl AppState {
    /// Wire the full dependency graph from a pool, configuration, and
    /// mail transport.
    ///
    /// A single [`HttpProviderClient`] serves as change feed, profile
    /// API, and authorizer; the Postgres-backed stores sit between the
    /// reconciler and the pool.
    pub fn new(pool: dropwatch_db::DbPool, config: ServerConfig, mailer: Arc<dyn Mailer>) -> Self {
        let provider = Arc::new(HttpProviderClient::new(config.provider.clone()));
        let token_store: Arc<dyn TokenStore> = Arc::new(PgTokenStore::new(pool.clone()));
        let cursor_store: Arc<dyn CursorStore> = Arc::new(PgCursorStore::new(pool.clone()));

        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&token_store),
            cursor_store,
            Arc::clone(&provider) as Arc<dyn ChangeFeed>,
        ));
        let dispatcher = Arc::new(Dispatcher::new(pool.clone(), mailer));

        Self {
            pool,
            config: Arc::new(config),
            reconciler,
            dispatcher,
            token_store,
            profile: Arc::clone(&provider) as Arc<dyn AccountProfile>,
            authorizer: provider,
            jobs: TaskTracker::new(),
        }
    }
}
