//! External-collaborator interfaces.
//!
//! Each trait mirrors one remote surface the core logic depends on.
//! Production code injects [`HttpProviderClient`](crate::HttpProviderClient)
//! for all three; tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{FeedPage, TokenGrant};

/// The provider's incremental change-feed API.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Request a cursor at the feed's current "latest" position for the
    /// whole account tree, recursive, with deletions included.
    ///
    /// Used to seed a newly linked account so pre-link history is never
    /// replayed.
    async fn get_latest_cursor(&self, token: &str) -> Result<String, ProviderError>;

    /// Fetch the next batch of entries after `cursor`.
    async fn list_changes(&self, token: &str, cursor: &str) -> Result<FeedPage, ProviderError>;
}

/// The provider's account-profile API.
#[async_trait]
pub trait AccountProfile: Send + Sync {
    /// Resolve the human-readable display name for the account the
    /// credential belongs to.
    async fn display_name(&self, token: &str) -> Result<String, ProviderError>;
}

/// The OAuth authorization service.
///
/// The cryptographic handshake is the provider's; this interface only
/// builds the redirect URL and exchanges the returned code.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Build the URL a user is sent to in order to authorize access.
    /// `state` is threaded through the flow verbatim.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a credential and account id.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, ProviderError>;
}
