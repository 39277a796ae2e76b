//! Clients for the storage provider's external interfaces.
//!
//! Three collaborators live behind `async-trait` interfaces so the rest
//! of the system never touches HTTP directly: the change-feed API
//! ([`ChangeFeed`]), the account-profile API ([`AccountProfile`]), and
//! the OAuth authorization service ([`Authorizer`]).
//! [`HttpProviderClient`] implements all three over `reqwest`.

pub mod http;
pub mod traits;
pub mod types;

mod error;

pub use error::ProviderError;
pub use http::HttpProviderClient;
pub use traits::{AccountProfile, Authorizer, ChangeFeed};
pub use types::{EntryKind, FeedEntry, FeedPage, TokenGrant};
