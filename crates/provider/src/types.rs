//! Wire types for the provider's change-feed and OAuth responses.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Change feed
// ---------------------------------------------------------------------------

/// Variant tag on a feed entry, decoded from the `.tag` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
    Deleted,
    /// Forward compatibility: any tag this version does not know.
    #[serde(other)]
    Unknown,
}

/// One raw entry from a change-feed batch.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    #[serde(rename = ".tag")]
    pub kind: EntryKind,
    pub name: String,
}

/// One batch of feed entries plus the position to resume from.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    /// Cursor to persist after processing this batch; also the argument
    /// for the next `list_changes` call when `has_more` is set.
    pub cursor: String,
    pub has_more: bool,
}

// ---------------------------------------------------------------------------
// OAuth
// ---------------------------------------------------------------------------

/// Result of exchanging an authorization code at the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub account_id: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
