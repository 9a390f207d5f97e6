//! RepoSyncState entity - per-repository incremental sync watermarks.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Watermarks marking when each resource type was last fully synced for
/// one repository.
///
/// The two watermarks are updated independently: a failed PR fetch must
/// not advance the commit watermark and vice versa. Watermarks only move
/// forward in wall-clock time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repo_sync_state")]
pub struct Model {
    /// The repository this state belongs to.
    #[sea_orm(primary_key, auto_increment = false)]
    pub repo_id: i64,
    /// When commits were last fully synced. Null before the first sync.
    pub last_commit_sync: Option<DateTimeWithTimeZone>,
    /// When pull requests were last fully synced. Null before the first sync.
    pub last_pr_sync: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
