//! Review entity - one review on a synced pull request.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A synced pull request review, keyed by GitHub's review id.
///
/// The review state is stored as the raw string GitHub reports
/// (`APPROVED`, `CHANGES_REQUESTED`, `COMMENTED`, ...) since the set is
/// open-ended and the dashboard only aggregates by it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    /// GitHub's numeric review id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Owning pull request (GitHub's global PR id).
    pub pull_request_id: i64,
    /// Reviewer login.
    pub reviewer_login: String,
    /// Review state as reported by GitHub.
    pub state: String,
    /// When the review was submitted.
    pub submitted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
