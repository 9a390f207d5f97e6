//! SyncRun entity - one invocation of the sync engine across a batch of
//! repositories.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::sync_status::SyncStatus;

/// Aggregate bookkeeping for one sync run.
///
/// Created when the run starts, mutated by per-repository progress
/// updates, finalized exactly once with a terminal status. Never deleted:
/// the `sync_runs` table is the append-only run history.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// When the run started.
    pub started_at: DateTimeWithTimeZone,
    /// When the run reached a terminal state. Null while running.
    pub finished_at: Option<DateTimeWithTimeZone>,
    /// Current status; `running` until finalized.
    pub status: SyncStatus,
    /// Number of repositories targeted by this run.
    pub total_repos: i32,
    /// Number of repositories fully processed so far.
    pub completed_repos: i32,
    /// Running total of commits ingested.
    pub commits_synced: i64,
    /// Running total of pull requests ingested.
    pub prs_synced: i64,
    /// Running total of reviews ingested.
    pub reviews_synced: i64,
    /// Error message for partial/error/cancelled runs.
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
