//! Operations on the tracked repository set.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::api::RemoteRepo;
use crate::entity::prelude::*;

use super::errors::{Result, StoreError};

/// Add a repository to the tracked set.
///
/// # Errors
/// Returns `StoreError::Database` if the insert fails (e.g., the
/// repository is already tracked).
pub async fn insert(db: &DatabaseConnection, remote: &RemoteRepo) -> Result<RepositoryModel> {
    let model = RepositoryActiveModel {
        id: Set(remote.id),
        owner: Set(remote.owner.clone()),
        name: Set(remote.name.clone()),
        added_at: Set(Utc::now().fixed_offset()),
    };
    model.insert(db).await.map_err(StoreError::from)
}

/// Find a tracked repository by GitHub id.
pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<RepositoryModel>> {
    Repository::find_by_id(id)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Find a tracked repository by owner and name.
pub async fn find_by_name(
    db: &DatabaseConnection,
    owner: &str,
    name: &str,
) -> Result<Option<RepositoryModel>> {
    Repository::find()
        .filter(RepositoryColumn::Owner.eq(owner))
        .filter(RepositoryColumn::Name.eq(name))
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// List all tracked repositories, ordered by owner then name.
pub async fn list(db: &DatabaseConnection) -> Result<Vec<RepositoryModel>> {
    Repository::find()
        .order_by_asc(RepositoryColumn::Owner)
        .order_by_asc(RepositoryColumn::Name)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Remove a repository and everything synced from it.
///
/// SQLite is opened without foreign key enforcement, so the cascade is
/// explicit: reviews of the repository's pull requests, the pull
/// requests, the commits, the sync state row, then the repository.
/// Returns the number of repository rows deleted (0 or 1).
pub async fn remove(db: &DatabaseConnection, id: i64) -> Result<u64> {
    let pr_ids: Vec<i64> = PullRequest::find()
        .filter(PullRequestColumn::RepoId.eq(id))
        .all(db)
        .await?
        .into_iter()
        .map(|pr| pr.id)
        .collect();

    if !pr_ids.is_empty() {
        Review::delete_many()
            .filter(ReviewColumn::PullRequestId.is_in(pr_ids))
            .exec(db)
            .await?;
    }

    PullRequest::delete_many()
        .filter(PullRequestColumn::RepoId.eq(id))
        .exec(db)
        .await?;

    Commit::delete_many()
        .filter(CommitColumn::RepoId.eq(id))
        .exec(db)
        .await?;

    RepoSyncState::delete_many()
        .filter(RepoSyncStateColumn::RepoId.eq(id))
        .exec(db)
        .await?;

    let result = Repository::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected)
}
