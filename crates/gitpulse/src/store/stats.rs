//! Aggregate queries for status reporting.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::entity::prelude::*;

use super::errors::Result;
use super::{commits, pull_requests, reviews, sync_state};

/// Per-repository sync summary for status output.
#[derive(Debug, Clone)]
pub struct RepoStats {
    pub repo: RepositoryModel,
    pub commits: u64,
    pub pulls: u64,
    pub merged_pulls: u64,
    pub reviews: u64,
    pub state: Option<RepoSyncStateModel>,
}

/// Overall coverage: how many tracked repositories have ever synced.
#[derive(Debug, Clone, Copy)]
pub struct Coverage {
    pub tracked: u64,
    pub synced: u64,
}

/// Compute per-repository sync stats for every tracked repository.
pub async fn per_repo(db: &DatabaseConnection) -> Result<Vec<RepoStats>> {
    let repos = super::repos::list(db).await?;
    let mut out = Vec::with_capacity(repos.len());

    for repo in repos {
        let stats = RepoStats {
            commits: commits::count_for_repo(db, repo.id).await?,
            pulls: pull_requests::count_for_repo(db, repo.id).await?,
            merged_pulls: pull_requests::count_merged_for_repo(db, repo.id).await?,
            reviews: reviews::count_for_repo(db, repo.id).await?,
            state: sync_state::get(db, repo.id).await?,
            repo,
        };
        out.push(stats);
    }

    Ok(out)
}

/// Compute overall sync coverage.
pub async fn coverage(db: &DatabaseConnection) -> Result<Coverage> {
    let tracked = Repository::find().count(db).await?;
    let synced = RepoSyncState::find().count(db).await?;
    Ok(Coverage { tracked, synced })
}
