//! Domain types and pure logic shared by every dropwatch crate.
//!
//! This crate has no internal dependencies so it can be used by the
//! API/repository layer, the reconciliation engine, and any future
//! worker or CLI tooling alike.

pub mod change;
pub mod error;
pub mod signature;
pub mod types;
