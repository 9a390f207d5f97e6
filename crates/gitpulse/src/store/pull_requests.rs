//! Operations on synced pull requests.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::api::{PullDetail, PullSummary};
use crate::entity::prelude::*;

use super::errors::Result;

/// Insert or update a pull request by GitHub's global PR id.
///
/// A PR seen in an earlier sync and updated since (new state, merge, line
/// counts) overwrites its existing row.
pub async fn upsert(
    db: &DatabaseConnection,
    repo_id: i64,
    summary: &PullSummary,
    detail: PullDetail,
) -> Result<PullRequestModel> {
    let model = PullRequestActiveModel {
        id: Set(summary.id),
        repo_id: Set(repo_id),
        number: Set(summary.number),
        author_login: Set(summary.author_login.clone()),
        title: Set(summary.title.clone()),
        state: Set(summary.state),
        additions: Set(detail.additions),
        deletions: Set(detail.deletions),
        created_at: Set(summary.created_at.fixed_offset()),
        merged_at: Set(summary.merged_at.map(|t| t.fixed_offset())),
        closed_at: Set(summary.closed_at.map(|t| t.fixed_offset())),
    };

    let existing = PullRequest::find_by_id(summary.id).one(db).await?;
    let saved = match existing {
        Some(_) => model.update(db).await?,
        None => model.insert(db).await?,
    };
    Ok(saved)
}

/// Count pull requests stored for one repository.
pub async fn count_for_repo(db: &DatabaseConnection, repo_id: i64) -> Result<u64> {
    let count = PullRequest::find()
        .filter(PullRequestColumn::RepoId.eq(repo_id))
        .count(db)
        .await?;
    Ok(count)
}

/// Count merged pull requests stored for one repository.
pub async fn count_merged_for_repo(db: &DatabaseConnection, repo_id: i64) -> Result<u64> {
    let count = PullRequest::find()
        .filter(PullRequestColumn::RepoId.eq(repo_id))
        .filter(PullRequestColumn::MergedAt.is_not_null())
        .count(db)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_and_migrate;
    use chrono::Utc;

    fn summary(id: i64, state: PrState, merged: bool) -> PullSummary {
        let now = Utc::now();
        PullSummary {
            id,
            number: id,
            author_login: Some("dev".to_string()),
            title: "feature".to_string(),
            state,
            created_at: now,
            updated_at: now,
            merged_at: merged.then_some(now),
            closed_at: merged.then_some(now),
        }
    }

    #[tokio::test]
    async fn test_upsert_tracks_state_transition() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();
        let detail = PullDetail {
            additions: 5,
            deletions: 1,
        };

        let open = upsert(&db, 1, &summary(7, PrState::Open, false), detail)
            .await
            .unwrap();
        assert_eq!(open.state, PrState::Open);
        assert!(!open.is_merged());

        let merged = upsert(&db, 1, &summary(7, PrState::Closed, true), detail)
            .await
            .unwrap();
        assert_eq!(merged.state, PrState::Closed);
        assert!(merged.is_merged());

        assert_eq!(count_for_repo(&db, 1).await.unwrap(), 1);
        assert_eq!(count_merged_for_repo(&db, 1).await.unwrap(), 1);
    }
}
