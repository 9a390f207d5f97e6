//! Operations on synced pull request reviews.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::api::ReviewRecord;
use crate::entity::prelude::*;

use super::errors::Result;

/// Insert or update a review by GitHub's review id.
pub async fn upsert(
    db: &DatabaseConnection,
    pull_request_id: i64,
    record: &ReviewRecord,
) -> Result<ReviewModel> {
    let model = ReviewActiveModel {
        id: Set(record.id),
        pull_request_id: Set(pull_request_id),
        reviewer_login: Set(record.reviewer_login.clone()),
        state: Set(record.state.clone()),
        submitted_at: Set(record.submitted_at.fixed_offset()),
    };

    let existing = Review::find_by_id(record.id).one(db).await?;
    let saved = match existing {
        Some(_) => model.update(db).await?,
        None => model.insert(db).await?,
    };
    Ok(saved)
}

/// Count reviews stored across all pull requests of one repository.
pub async fn count_for_repo(db: &DatabaseConnection, repo_id: i64) -> Result<u64> {
    let pr_ids: Vec<i64> = PullRequest::find()
        .filter(PullRequestColumn::RepoId.eq(repo_id))
        .all(db)
        .await?
        .into_iter()
        .map(|pr| pr.id)
        .collect();

    if pr_ids.is_empty() {
        return Ok(0);
    }

    let count = Review::find()
        .filter(ReviewColumn::PullRequestId.is_in(pr_ids))
        .count(db)
        .await?;
    Ok(count)
}
