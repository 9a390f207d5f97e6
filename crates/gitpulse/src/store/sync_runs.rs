//! Sync run history.
//!
//! One row per engine invocation. Rows are created `running`, mutated as
//! repositories complete, and finalized exactly once with a terminal
//! status. The table is append-only history; rows are never deleted.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set, Unchanged,
};
use uuid::Uuid;

use crate::entity::prelude::*;
use crate::entity::sync_status::SyncStatus;

use super::errors::{Result, StoreError};

/// Counts of items ingested for one repository within a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoCounts {
    pub commits: i64,
    pub pulls: i64,
    pub reviews: i64,
}

/// Create a new run row in the `running` state.
pub async fn create(db: &DatabaseConnection, id: Uuid, total_repos: i32) -> Result<SyncRunModel> {
    let model = SyncRunActiveModel {
        id: Set(id),
        started_at: Set(Utc::now().fixed_offset()),
        finished_at: Set(None),
        status: Set(SyncStatus::Running),
        total_repos: Set(total_repos),
        completed_repos: Set(0),
        commits_synced: Set(0),
        prs_synced: Set(0),
        reviews_synced: Set(0),
        error_message: Set(None),
    };
    Ok(model.insert(db).await?)
}

/// Fetch a run by id.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<SyncRunModel>> {
    Ok(SyncRun::find_by_id(id).one(db).await?)
}

/// Fetch the most recently started runs, newest first.
pub async fn recent(db: &DatabaseConnection, limit: u64) -> Result<Vec<SyncRunModel>> {
    Ok(SyncRun::find()
        .order_by_desc(SyncRunColumn::StartedAt)
        .limit(limit)
        .all(db)
        .await?)
}

/// Record one repository's completion: bump the completed counter and
/// add its item counts to the running totals.
pub async fn record_repo_done(
    db: &DatabaseConnection,
    id: Uuid,
    counts: RepoCounts,
) -> Result<SyncRunModel> {
    let run = require(db, id).await?;

    let model = SyncRunActiveModel {
        id: Unchanged(run.id),
        completed_repos: Set(run.completed_repos + 1),
        commits_synced: Set(run.commits_synced + counts.commits),
        prs_synced: Set(run.prs_synced + counts.pulls),
        reviews_synced: Set(run.reviews_synced + counts.reviews),
        ..Default::default()
    };
    Ok(model.update(db).await?)
}

/// Finalize a run with a terminal status.
///
/// Finalizing a run that is already terminal is rejected; the first
/// terminal status wins.
pub async fn finalize(
    db: &DatabaseConnection,
    id: Uuid,
    status: SyncStatus,
    error_message: Option<String>,
) -> Result<SyncRunModel> {
    if !status.is_terminal() {
        return Err(StoreError::InvalidInput {
            message: format!("cannot finalize run {} with status {}", id, status),
        });
    }

    let run = require(db, id).await?;
    if run.status.is_terminal() {
        return Err(StoreError::InvalidInput {
            message: format!("run {} already finalized as {}", id, run.status),
        });
    }

    let model = SyncRunActiveModel {
        id: Unchanged(run.id),
        finished_at: Set(Some(Utc::now().fixed_offset())),
        status: Set(status),
        error_message: Set(error_message),
        ..Default::default()
    };
    Ok(model.update(db).await?)
}

async fn require(db: &DatabaseConnection, id: Uuid) -> Result<SyncRunModel> {
    find_by_id(db, id).await?.ok_or(StoreError::NotFound {
        context: format!("sync run id={}", id),
    })
}
