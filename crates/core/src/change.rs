//! Change classification types for one reconciliation pass.
//!
//! A pass over an account's change feed produces a stream of
//! [`ChangeEntry`] values which are folded into a [`ChangeSummary`].
//! Both types are ephemeral: they live for a single pass and are never
//! persisted.

use serde::Serialize;

// ---------------------------------------------------------------------------
// ChangeEntry
// ---------------------------------------------------------------------------

/// One classified unit of change from the remote feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEntry {
    /// A file was added or modified; carries the entry name.
    FileAdded(String),
    /// A folder was created; carries the entry name.
    FolderAdded(String),
    /// A file or folder was deleted; carries the entry name.
    Removed(String),
}

// ---------------------------------------------------------------------------
// ChangeSummary
// ---------------------------------------------------------------------------

/// Aggregated changes from one reconciliation pass.
///
/// Entries are appended in feed order within each bucket; buckets are
/// never reordered or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    /// Names of files added or modified.
    pub new_files: Vec<String>,
    /// Names of folders created.
    pub new_folders: Vec<String>,
    /// Names of deleted files and folders.
    pub deleted: Vec<String>,
}

impl ChangeSummary {
    /// Append one classified entry to the matching bucket.
    pub fn record(&mut self, entry: ChangeEntry) {
        match entry {
            ChangeEntry::FileAdded(name) => self.new_files.push(name),
            ChangeEntry::FolderAdded(name) => self.new_folders.push(name),
            ChangeEntry::Removed(name) => self.deleted.push(name),
        }
    }

    /// `true` when no bucket holds any entry.
    ///
    /// An empty summary must not trigger any notification.
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.new_folders.is_empty() && self.deleted.is_empty()
    }

    /// Total number of recorded entries across all buckets.
    pub fn len(&self) -> usize {
        self.new_files.len() + self.new_folders.len() + self.deleted.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
