//! Incremental change reconciliation.
//!
//! The reconciler maintains a durable per-account cursor into the
//! provider's change feed, pages through pending batches until caught
//! up, classifies every entry, and returns the aggregated
//! [`ChangeSummary`](dropwatch_core::change::ChangeSummary) for one
//! pass. Credential and cursor persistence sit behind the [`TokenStore`]
//! and [`CursorStore`] contracts so the engine is independent of the
//! storage backend.

pub mod reconciler;
pub mod store;

pub use reconciler::{ReconcileError, Reconciler};
pub use store::{CursorStore, PgCursorStore, PgTokenStore, StoreError, TokenStore};
