pub mod feed_cursor;
pub mod linked_account;
pub mod recipient;
