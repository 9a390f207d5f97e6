//! Pull request state enum.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The state of a pull request as reported by GitHub.
///
/// Merged PRs report `closed` here; merge status is carried separately by
/// the nullable `merged_at` timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PrState {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrState::Open => write!(f, "open"),
            PrState::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for PrState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(PrState::Open),
            "closed" => Ok(PrState::Closed),
            _ => Err(format!("Unknown pull request state: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        assert_eq!("open".parse::<PrState>().unwrap(), PrState::Open);
        assert_eq!("closed".parse::<PrState>().unwrap(), PrState::Closed);
        assert_eq!(PrState::Open.to_string(), "open");
        assert_eq!(PrState::Closed.to_string(), "closed");
    }

    #[test]
    fn test_unknown_state_rejected() {
        assert!("merged".parse::<PrState>().is_err());
    }
}
