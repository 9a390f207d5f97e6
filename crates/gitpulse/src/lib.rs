//! Gitpulse - a local-first GitHub engineering-activity sync engine.
//!
//! This library pulls commits, pull requests, and reviews for a set of
//! tracked repositories from the GitHub REST API into a local SQLite
//! database, incrementally and idempotently, while staying inside the
//! API's rate-limit budget.
//!
//! # Example
//!
//! ```ignore
//! use gitpulse::{connect_and_migrate, github::GitHubClient};
//! use gitpulse::sync::{SyncEngine, SyncOptions, SyncTargets};
//!
//! let db = connect_and_migrate("sqlite://gitpulse.db?mode=rwc").await?;
//! let api = GitHubClient::new(&token)?;
//! let engine = SyncEngine::new(api, db, SyncOptions::default());
//!
//! let cancel = tokio_util::sync::CancellationToken::new();
//! let (run_id, mut events) = engine.start(SyncTargets::All, cancel).await?;
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

pub mod api;
pub mod db;
pub mod entity;
pub mod github;
pub mod migration;
pub mod store;
pub mod sync;

pub use api::{ActivityApi, ApiError, RateLimitInfo};
pub use db::{connect, connect_and_migrate};
pub use entity::prelude::*;
pub use store::StoreError;
pub use sync::{SyncEngine, SyncError, SyncEvent, SyncOptions, SyncTargets};
