//! Persistence layer over the sea-orm entities.
//!
//! Each submodule owns the operations for one table. Functions take a
//! `&DatabaseConnection` and return [`errors::Result`]; no sync logic
//! lives here. All writes the engine performs are upserts by natural key
//! so re-syncing the same window is idempotent.

pub mod commits;
pub mod errors;
pub mod pull_requests;
pub mod repos;
pub mod reviews;
pub mod stats;
pub mod sync_runs;
pub mod sync_state;

pub use errors::{Result, StoreError};
