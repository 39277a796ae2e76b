//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod feed_cursor_repo;
pub mod linked_account_repo;
pub mod recipient_repo;

pub use feed_cursor_repo::FeedCursorRepo;
pub use linked_account_repo::LinkedAccountRepo;
pub use recipient_repo::RecipientRepo;
