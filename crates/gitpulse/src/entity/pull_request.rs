//! PullRequest entity - one pull request synced from a tracked repository.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::pr_state::PrState;

/// A synced pull request, keyed by GitHub's global PR id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pull_requests")]
pub struct Model {
    /// GitHub's numeric pull request id (global, not the per-repo number).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Owning repository.
    pub repo_id: i64,
    /// Per-repository pull request number.
    pub number: i64,
    /// Author login. Null when the remote user is unattributed.
    pub author_login: Option<String>,
    /// Pull request title.
    #[sea_orm(column_type = "Text")]
    pub title: String,
    /// Open or closed.
    pub state: PrState,
    /// Lines added, from the PR detail endpoint.
    pub additions: i32,
    /// Lines removed, from the PR detail endpoint.
    pub deletions: i32,
    /// When the PR was opened.
    pub created_at: DateTimeWithTimeZone,
    /// When the PR was merged. Null means not merged.
    pub merged_at: Option<DateTimeWithTimeZone>,
    /// When the PR was closed. Null while open.
    pub closed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this pull request was merged.
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}
