//! Commit entity - one commit synced from a tracked repository.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A synced commit, keyed by its SHA.
///
/// Commits are written only by the sync engine, as upserts by SHA:
/// re-fetching a known SHA overwrites the row rather than duplicating it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commits")]
pub struct Model {
    /// Commit SHA (natural key).
    #[sea_orm(primary_key, auto_increment = false)]
    pub sha: String,
    /// Owning repository.
    pub repo_id: i64,
    /// Author login. Null when the remote user is unattributed.
    pub author_login: Option<String>,
    /// Author email from the commit metadata.
    pub author_email: Option<String>,
    /// Commit message.
    #[sea_orm(column_type = "Text")]
    pub message: String,
    /// Lines added, from the commit detail endpoint.
    pub additions: i32,
    /// Lines removed, from the commit detail endpoint.
    pub deletions: i32,
    /// When the commit was authored.
    pub committed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
