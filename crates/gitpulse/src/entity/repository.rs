//! Repository entity - a tracked GitHub repository.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A repository the user has chosen to track.
///
/// The primary key is GitHub's numeric repository id, so one tracked
/// repository maps to exactly one remote repository even across renames.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repositories")]
pub struct Model {
    /// GitHub's numeric repository id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Owner login (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// When the repository was added to the tracked set.
    pub added_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Compute the full name (owner/name).
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_full_name() {
        let model = Model {
            id: 42,
            owner: "acme".to_string(),
            name: "widgets".to_string(),
            added_at: Utc::now().fixed_offset(),
        };
        assert_eq!(model.full_name(), "acme/widgets");
    }
}
