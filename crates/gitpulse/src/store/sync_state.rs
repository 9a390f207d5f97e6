//! Per-repository incremental sync watermarks.
//!
//! The commit and pull request watermarks move independently: each is
//! advanced only after its own phase of a sync cycle completes, so a
//! failure in one phase never causes the other to skip data.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entity::prelude::*;

use super::errors::Result;

/// Fetch the sync state row for a repository, if it has ever synced.
pub async fn get(db: &DatabaseConnection, repo_id: i64) -> Result<Option<RepoSyncStateModel>> {
    let state = RepoSyncState::find_by_id(repo_id).one(db).await?;
    Ok(state)
}

/// Advance the commit watermark, leaving the PR watermark untouched.
pub async fn set_commit_watermark(
    db: &DatabaseConnection,
    repo_id: i64,
    at: DateTime<Utc>,
) -> Result<RepoSyncStateModel> {
    match RepoSyncState::find_by_id(repo_id).one(db).await? {
        Some(existing) => {
            let mut model: RepoSyncStateActiveModel = existing.into();
            model.last_commit_sync = Set(Some(at.fixed_offset()));
            Ok(model.update(db).await?)
        }
        None => {
            let model = RepoSyncStateActiveModel {
                repo_id: Set(repo_id),
                last_commit_sync: Set(Some(at.fixed_offset())),
                last_pr_sync: Set(None),
            };
            Ok(model.insert(db).await?)
        }
    }
}

/// Advance the PR watermark, leaving the commit watermark untouched.
pub async fn set_pr_watermark(
    db: &DatabaseConnection,
    repo_id: i64,
    at: DateTime<Utc>,
) -> Result<RepoSyncStateModel> {
    match RepoSyncState::find_by_id(repo_id).one(db).await? {
        Some(existing) => {
            let mut model: RepoSyncStateActiveModel = existing.into();
            model.last_pr_sync = Set(Some(at.fixed_offset()));
            Ok(model.update(db).await?)
        }
        None => {
            let model = RepoSyncStateActiveModel {
                repo_id: Set(repo_id),
                last_commit_sync: Set(None),
                last_pr_sync: Set(Some(at.fixed_offset())),
            };
            Ok(model.insert(db).await?)
        }
    }
}
