//! The change reconciliation engine.
//!
//! One [`Reconciler::reconcile`] call brings a single account's cursor
//! from its last persisted position to the feed's current head and
//! returns everything classified along the way. Webhook delivery is
//! unreliable, concurrent, and duplicate-prone, so the engine is built
//! around two rules: the cursor only ever moves forward, and progress is
//! persisted batch-by-batch rather than atomically per pass.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dropwatch_core::change::{ChangeEntry, ChangeSummary};
use dropwatch_provider::{ChangeFeed, EntryKind, ProviderError};

use crate::store::{CursorStore, StoreError, TokenStore};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a failed reconciliation pass.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Reconciliation requested for an account with no stored credential.
    #[error("Account {0} is not linked")]
    NotLinked(String),

    /// A feed or network failure mid-paging. Cursor progress persisted
    /// for earlier batches within the pass is kept.
    #[error(transparent)]
    Feed(#[from] ProviderError),

    /// A credential or cursor store failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ReconcileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingCredential { account_id } => ReconcileError::NotLinked(account_id),
            other => ReconcileError::Store(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-account serialization
// ---------------------------------------------------------------------------

/// Lazily allocated per-account async mutexes.
///
/// Webhook deliveries for the same account can burst; without this,
/// two passes could read the same stale cursor, page independently, and
/// report overlapping change sets. One entry is kept per account ever
/// reconciled by this process.
#[derive(Default)]
struct AccountLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AccountLocks {
    fn for_account(&self, account_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().expect("account lock map poisoned");
        Arc::clone(
            map.entry(account_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Pages through an account's change feed and classifies every entry.
pub struct Reconciler {
    token_store: Arc<dyn TokenStore>,
    cursor_store: Arc<dyn CursorStore>,
    feed: Arc<dyn ChangeFeed>,
    locks: AccountLocks,
}

impl Reconciler {
    /// Create a reconciler over the given stores and feed client.
    pub fn new(
        token_store: Arc<dyn TokenStore>,
        cursor_store: Arc<dyn CursorStore>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        Self {
            token_store,
            cursor_store,
            feed,
            locks: AccountLocks::default(),
        }
    }

    /// Run one reconciliation pass for `account_id`.
    ///
    /// Resumes from the persisted cursor, or seeds a fresh cursor at the
    /// feed's latest position for a never-reconciled account: a new
    /// link reports changes from that point forward, never the
    /// account's pre-link history.
    ///
    /// The batch cursor is persisted unconditionally after every
    /// processed batch, including the last, before `has_more` is
    /// consulted. A failure mid-paging aborts the pass but keeps the
    /// cursors already persisted: retrying re-delivers at most one
    /// batch's worth of duplicate classifications instead of replaying
    /// the whole backlog. No retry happens here; the next webhook
    /// delivery is the retry.
    ///
    /// Passes for the same account are serialized; passes for distinct
    /// accounts run concurrently.
    pub async fn reconcile(&self, account_id: &str) -> Result<ChangeSummary, ReconcileError> {
        let account_lock = self.locks.for_account(account_id);
        let _guard = account_lock.lock().await;

        let token = self.token_store.get(account_id).await?;

        let mut cursor = match self.cursor_store.get(account_id).await? {
            Some(cursor) => cursor,
            None => {
                let fresh = self.feed.get_latest_cursor(&token).await?;
                tracing::info!(account_id, "Seeded feed cursor at latest position");
                fresh
            }
        };

        let mut summary = ChangeSummary::default();
        let mut batches = 0u32;

        loop {
            let page = self.feed.list_changes(&token, &cursor).await?;
            batches += 1;

            for entry in page.entries {
                match entry.kind {
                    EntryKind::File => summary.record(ChangeEntry::FileAdded(entry.name)),
                    EntryKind::Folder => summary.record(ChangeEntry::FolderAdded(entry.name)),
                    EntryKind::Deleted => summary.record(ChangeEntry::Removed(entry.name)),
                    EntryKind::Unknown => {
                        tracing::debug!(account_id, name = %entry.name, "Skipping unrecognized feed entry");
                    }
                }
            }

            // Persist before checking has_more so a later failure never
            // rewinds past a batch that was already processed.
            self.cursor_store.set(account_id, &page.cursor).await?;
            cursor = page.cursor;

            if !page.has_more {
                break;
            }
        }

        tracing::info!(
            account_id,
            batches,
            new_files = summary.new_files.len(),
            new_folders = summary.new_folders.len(),
            deleted = summary.deleted.len(),
            "Reconciliation pass complete",
        );

        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use dropwatch_provider::{FeedEntry, FeedPage, ProviderError};

    use super::*;

    // -- In-memory fakes ----------------------------------------------------

    #[derive(Default)]
    struct MemTokenStore {
        tokens: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl TokenStore for MemTokenStore {
        async fn get(&self, account_id: &str) -> Result<String, StoreError> {
            self.tokens
                .lock()
                .unwrap()
                .get(account_id)
                .cloned()
                .ok_or_else(|| StoreError::MissingCredential {
                    account_id: account_id.to_string(),
                })
        }

        async fn set(&self, account_id: &str, credential: &str) -> Result<(), StoreError> {
            self.tokens
                .lock()
                .unwrap()
                .insert(account_id.to_string(), credential.to_string());
            Ok(())
        }
    }

    /// Cursor store that records every persisted value in order.
    #[derive(Default)]
    struct MemCursorStore {
        current: Mutex<HashMap<String, String>>,
        history: Mutex<Vec<String>>,
    }

    impl MemCursorStore {
        fn history(&self) -> Vec<String> {
            self.history.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CursorStore for MemCursorStore {
        async fn get(&self, account_id: &str) -> Result<Option<String>, StoreError> {
            Ok(self.current.lock().unwrap().get(account_id).cloned())
        }

        async fn set(&self, account_id: &str, cursor: &str) -> Result<(), StoreError> {
            self.current
                .lock()
                .unwrap()
                .insert(account_id.to_string(), cursor.to_string());
            self.history.lock().unwrap().push(cursor.to_string());
            Ok(())
        }
    }

    /// Scripted feed: a map from request cursor to the page it returns.
    /// Unknown cursors produce a feed failure, which stands in for a
    /// network error mid-paging.
    #[derive(Default)]
    struct ScriptedFeed {
        latest: String,
        pages: HashMap<String, FeedPage>,
        in_flight: AtomicU32,
        max_in_flight: AtomicU32,
    }

    impl ScriptedFeed {
        fn page(entries: Vec<(EntryKind, &str)>, cursor: &str, has_more: bool) -> FeedPage {
            FeedPage {
                entries: entries
                    .into_iter()
                    .map(|(kind, name)| FeedEntry {
                        kind,
                        name: name.to_string(),
                    })
                    .collect(),
                cursor: cursor.to_string(),
                has_more,
            }
        }
    }

    #[async_trait]
    impl ChangeFeed for ScriptedFeed {
        async fn get_latest_cursor(&self, _token: &str) -> Result<String, ProviderError> {
            Ok(self.latest.clone())
        }

        async fn list_changes(&self, _token: &str, cursor: &str) -> Result<FeedPage, ProviderError> {
            let before = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(before, Ordering::SeqCst);
            // Yield so a concurrent pass would be observed if one ran.
            tokio::time::sleep(Duration::from_millis(5)).await;
            let result = self
                .pages
                .get(cursor)
                .cloned()
                .ok_or(ProviderError::HttpStatus(503));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn reconciler_with(
        feed: ScriptedFeed,
    ) -> (Arc<MemTokenStore>, Arc<MemCursorStore>, Reconciler) {
        let tokens = Arc::new(MemTokenStore::default());
        let cursors = Arc::new(MemCursorStore::default());
        let reconciler = Reconciler::new(
            Arc::clone(&tokens) as Arc<dyn TokenStore>,
            Arc::clone(&cursors) as Arc<dyn CursorStore>,
            Arc::new(feed),
        );
        (tokens, cursors, reconciler)
    }

    // -- Tests --------------------------------------------------------------

    #[tokio::test]
    async fn unlinked_account_fails_with_not_linked() {
        let (_tokens, _cursors, reconciler) = reconciler_with(ScriptedFeed::default());

        let result = reconciler.reconcile("dbid:GHOST").await;
        assert_matches!(result, Err(ReconcileError::NotLinked(id)) if id == "dbid:GHOST");
    }

    #[tokio::test]
    async fn cold_start_seeds_at_latest_and_skips_history() {
        // The account already has 100 pre-link files; the latest cursor
        // points past all of them and the first continue returns nothing.
        let mut feed = ScriptedFeed {
            latest: "head".to_string(),
            ..Default::default()
        };
        feed.pages
            .insert("head".into(), ScriptedFeed::page(vec![], "head-2", false));

        let (tokens, cursors, reconciler) = reconciler_with(feed);
        tokens.set("dbid:AAA", "tok").await.unwrap();

        let summary = reconciler.reconcile("dbid:AAA").await.unwrap();

        assert!(summary.is_empty());
        // The post-batch cursor is persisted even for an empty batch.
        assert_eq!(cursors.get("dbid:AAA").await.unwrap().as_deref(), Some("head-2"));
    }

    #[tokio::test]
    async fn classifies_one_batch_in_feed_order() {
        let mut feed = ScriptedFeed::default();
        feed.pages.insert(
            "c1".into(),
            ScriptedFeed::page(
                vec![
                    (EntryKind::Deleted, "old.txt"),
                    (EntryKind::File, "report.pdf"),
                    (EntryKind::Folder, "photos"),
                ],
                "c2",
                false,
            ),
        );

        let (tokens, cursors, reconciler) = reconciler_with(feed);
        tokens.set("dbid:AAA", "tok").await.unwrap();
        cursors.set("dbid:AAA", "c1").await.unwrap();

        let summary = reconciler.reconcile("dbid:AAA").await.unwrap();

        assert_eq!(summary.deleted, vec!["old.txt"]);
        assert_eq!(summary.new_files, vec!["report.pdf"]);
        assert_eq!(summary.new_folders, vec!["photos"]);
    }

    #[tokio::test]
    async fn pages_until_caught_up_and_persists_every_batch_cursor() {
        let mut feed = ScriptedFeed::default();
        feed.pages.insert(
            "c1".into(),
            ScriptedFeed::page(vec![(EntryKind::File, "a.txt")], "c2", true),
        );
        feed.pages.insert(
            "c2".into(),
            ScriptedFeed::page(vec![(EntryKind::File, "b.txt")], "c3", true),
        );
        feed.pages.insert(
            "c3".into(),
            ScriptedFeed::page(vec![(EntryKind::File, "c.txt")], "c4", false),
        );

        let (tokens, cursors, reconciler) = reconciler_with(feed);
        tokens.set("dbid:AAA", "tok").await.unwrap();
        cursors.set("dbid:AAA", "c1").await.unwrap();

        let summary = reconciler.reconcile("dbid:AAA").await.unwrap();

        assert_eq!(summary.new_files, vec!["a.txt", "b.txt", "c.txt"]);
        // Seed write plus one write per processed batch, forward only.
        assert_eq!(cursors.history(), vec!["c1", "c2", "c3", "c4"]);
    }

    #[tokio::test]
    async fn failure_mid_paging_keeps_prior_batch_cursor() {
        // Batch c1 -> c2 succeeds; c2 has no scripted page, so the pass
        // dies there.
        let mut feed = ScriptedFeed::default();
        feed.pages.insert(
            "c1".into(),
            ScriptedFeed::page(vec![(EntryKind::File, "a.txt")], "c2", true),
        );

        let (tokens, cursors, reconciler) = reconciler_with(feed);
        tokens.set("dbid:AAA", "tok").await.unwrap();
        cursors.set("dbid:AAA", "c1").await.unwrap();

        let result = reconciler.reconcile("dbid:AAA").await;
        assert_matches!(result, Err(ReconcileError::Feed(_)));

        // Progress from batch 1 survives the abort: the next pass
        // resumes from c2, not c1.
        assert_eq!(cursors.get("dbid:AAA").await.unwrap().as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn resumed_pass_picks_up_from_persisted_cursor() {
        let mut feed = ScriptedFeed::default();
        feed.pages.insert(
            "c1".into(),
            ScriptedFeed::page(vec![(EntryKind::File, "a.txt")], "c2", true),
        );

        let (tokens, cursors, reconciler) = reconciler_with(feed);
        tokens.set("dbid:AAA", "tok").await.unwrap();
        cursors.set("dbid:AAA", "c1").await.unwrap();

        // First pass fails after batch 1 (c2 is not scripted yet).
        assert!(reconciler.reconcile("dbid:AAA").await.is_err());

        // "The provider recovers": now c2 resolves.
        let mut feed = ScriptedFeed::default();
        feed.pages.insert(
            "c2".into(),
            ScriptedFeed::page(vec![(EntryKind::File, "b.txt")], "c3", false),
        );
        let reconciler = Reconciler::new(
            Arc::clone(&tokens) as Arc<dyn TokenStore>,
            Arc::clone(&cursors) as Arc<dyn CursorStore>,
            Arc::new(feed),
        );

        let summary = reconciler.reconcile("dbid:AAA").await.unwrap();

        // Only batch 2's entries appear; batch 1 is not replayed.
        assert_eq!(summary.new_files, vec!["b.txt"]);
    }

    #[tokio::test]
    async fn unknown_entry_kinds_are_skipped() {
        let mut feed = ScriptedFeed::default();
        feed.pages.insert(
            "c1".into(),
            ScriptedFeed::page(
                vec![(EntryKind::Unknown, "mystery"), (EntryKind::File, "a.txt")],
                "c2",
                false,
            ),
        );

        let (tokens, cursors, reconciler) = reconciler_with(feed);
        tokens.set("dbid:AAA", "tok").await.unwrap();
        cursors.set("dbid:AAA", "c1").await.unwrap();

        let summary = reconciler.reconcile("dbid:AAA").await.unwrap();
        assert_eq!(summary.new_files, vec!["a.txt"]);
        assert_eq!(summary.len(), 1);
    }

    #[tokio::test]
    async fn same_account_passes_are_serialized() {
        let mut feed = ScriptedFeed::default();
        feed.pages.insert(
            "c1".into(),
            ScriptedFeed::page(vec![(EntryKind::File, "a.txt")], "c1", false),
        );
        let feed = Arc::new(feed);

        let tokens = Arc::new(MemTokenStore::default());
        let cursors = Arc::new(MemCursorStore::default());
        tokens.set("dbid:AAA", "tok").await.unwrap();
        cursors.set("dbid:AAA", "c1").await.unwrap();

        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&tokens) as Arc<dyn TokenStore>,
            Arc::clone(&cursors) as Arc<dyn CursorStore>,
            Arc::clone(&feed) as Arc<dyn ChangeFeed>,
        ));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let reconciler = Arc::clone(&reconciler);
            handles.push(tokio::spawn(async move {
                reconciler.reconcile("dbid:AAA").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // With the per-account mutex, the feed never sees overlapping
        // requests for one account.
        assert_eq!(feed.max_in_flight.load(Ordering::SeqCst), 1);
    }
}
