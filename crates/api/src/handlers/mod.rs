//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to repositories in `dropwatch_db` or to the
//! injected engine/clients in [`AppState`](crate::state::AppState), and
//! map errors via [`AppError`](crate::error::AppError).

pub mod alerts;
pub mod link;
pub mod webhook;
