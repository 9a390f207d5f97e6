//! Incremental activity sync.
//!
//! # Module Structure
//!
//! - [`types`] - Options, targets, and tuning constants
//! - [`error`] - `SyncError` and its event-facing classification
//! - [`progress`] - The typed progress event stream
//! - [`governor`] - Request pacing and budget enforcement
//! - [`engine`] - `SyncEngine`: run lifecycle and per-repo sequencing
//!
//! # Example
//!
//! ```ignore
//! use gitpulse::sync::{SyncEngine, SyncOptions, SyncTargets};
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = SyncEngine::new(client, db, SyncOptions::default());
//! let (run_id, mut events) = engine
//!     .start(SyncTargets::All, CancellationToken::new())
//!     .await?;
//! while let Some(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! ```

pub mod engine;
pub mod error;
pub mod governor;
pub mod progress;
pub mod types;

pub use engine::SyncEngine;
pub use error::{SyncError, SyncErrorKind};
pub use governor::RateLimitGovernor;
pub use progress::{ProgressSender, SyncEvent};
pub use types::{RunTotals, SyncOptions, SyncTargets};

pub use types::{
    BUDGET_CHECK_INTERVAL, COMMIT_PROGRESS_EVERY, DEFAULT_COMMIT_PAGE_SIZE, DEFAULT_PR_PAGE_SIZE,
    INLOOP_MIN_BUDGET, PR_PROGRESS_EVERY, PREFLIGHT_MIN_BUDGET, REQUEST_SPACING_MS,
};
