//! Sync run status enum.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Terminal and in-flight states of a sync run.
///
/// A run is `Running` until finalized exactly once to one of the terminal
/// states:
/// - `Complete` - all target repositories processed without a fatal error
/// - `Partial` - a fatal error after at least one repository completed
/// - `Error` - a fatal error before any repository completed
/// - `Cancelled` - the run was cancelled via the cancellation token
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "complete")]
    Complete,
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "error")]
    Error,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl SyncStatus {
    /// Whether this status is terminal (the run can no longer change).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncStatus::Running)
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Running => write!(f, "running"),
            SyncStatus::Complete => write!(f, "complete"),
            SyncStatus::Partial => write!(f, "partial"),
            SyncStatus::Error => write!(f, "error"),
            SyncStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}
