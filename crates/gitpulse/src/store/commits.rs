//! Operations on synced commits.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::api::{CommitDetail, CommitSummary};
use crate::entity::prelude::*;

use super::errors::Result;

/// Insert or update a commit by SHA.
///
/// Re-fetching a SHA the store already holds overwrites the row, so
/// replaying an overlapping sync window never duplicates commits.
pub async fn upsert(
    db: &DatabaseConnection,
    repo_id: i64,
    summary: &CommitSummary,
    detail: CommitDetail,
) -> Result<CommitModel> {
    let model = CommitActiveModel {
        sha: Set(summary.sha.clone()),
        repo_id: Set(repo_id),
        author_login: Set(summary.author_login.clone()),
        author_email: Set(summary.author_email.clone()),
        message: Set(summary.message.clone()),
        additions: Set(detail.additions),
        deletions: Set(detail.deletions),
        committed_at: Set(summary.committed_at.fixed_offset()),
    };

    let existing = Commit::find_by_id(&summary.sha).one(db).await?;
    let saved = match existing {
        Some(_) => model.update(db).await?,
        None => model.insert(db).await?,
    };
    Ok(saved)
}

/// Count commits stored for one repository.
pub async fn count_for_repo(db: &DatabaseConnection, repo_id: i64) -> Result<u64> {
    let count = Commit::find()
        .filter(CommitColumn::RepoId.eq(repo_id))
        .count(db)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_and_migrate;
    use chrono::Utc;

    fn summary(sha: &str, message: &str) -> CommitSummary {
        CommitSummary {
            sha: sha.to_string(),
            author_login: Some("dev".to_string()),
            author_email: Some("dev@example.com".to_string()),
            message: message.to_string(),
            committed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_by_sha() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();

        let first = upsert(
            &db,
            1,
            &summary("abc", "initial"),
            CommitDetail {
                additions: 10,
                deletions: 2,
            },
        )
        .await
        .unwrap();
        assert_eq!(first.additions, 10);

        let second = upsert(
            &db,
            1,
            &summary("abc", "amended"),
            CommitDetail {
                additions: 12,
                deletions: 3,
            },
        )
        .await
        .unwrap();
        assert_eq!(second.message, "amended");
        assert_eq!(second.additions, 12);

        assert_eq!(count_for_repo(&db, 1).await.unwrap(), 1);
    }
}
