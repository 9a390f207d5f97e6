//! Sync error taxonomy.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::api::ApiError;
use crate::store::StoreError;

/// Errors that can occur during a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Another run holds the run lock. Only one run at a time.
    #[error("a sync run is already in progress")]
    AlreadyRunning,

    /// The target set resolved to zero repositories.
    #[error("no repositories to sync")]
    EmptyTargetSet,

    /// A named target is not in the tracked set.
    #[error("repository not tracked: {0}")]
    NotTracked(String),

    /// Credentials missing or rejected by the remote.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Remote budget exhausted or below the required minimum.
    #[error("rate limit budget exhausted ({remaining} remaining, resets at {reset_at})")]
    RateLimited {
        reset_at: DateTime<Utc>,
        remaining: usize,
    },

    /// A remote resource disappeared mid-run.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other remote-call failure.
    #[error("remote call failed: {0}")]
    Api(String),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The run was cancelled via its cancellation token.
    #[error("sync cancelled")]
    Cancelled,
}

/// Coarse classification of a [`SyncError`], carried on terminal error
/// events so consumers can react without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorKind {
    AlreadyRunning,
    EmptyTargetSet,
    NotTracked,
    Auth,
    RateLimited,
    NotFound,
    Api,
    Store,
    Cancelled,
}

impl SyncError {
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::AlreadyRunning => SyncErrorKind::AlreadyRunning,
            SyncError::EmptyTargetSet => SyncErrorKind::EmptyTargetSet,
            SyncError::NotTracked(_) => SyncErrorKind::NotTracked,
            SyncError::Auth(_) => SyncErrorKind::Auth,
            SyncError::RateLimited { .. } => SyncErrorKind::RateLimited,
            SyncError::NotFound(_) => SyncErrorKind::NotFound,
            SyncError::Api(_) => SyncErrorKind::Api,
            SyncError::Store(_) => SyncErrorKind::Store,
            SyncError::Cancelled => SyncErrorKind::Cancelled,
        }
    }

    /// The budget reset time, when this error carries one.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SyncError::RateLimited { reset_at, .. } => Some(*reset_at),
            _ => None,
        }
    }
}

impl From<ApiError> for SyncError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Auth(msg) => SyncError::Auth(msg),
            ApiError::RateLimited {
                reset_at,
                remaining,
            } => SyncError::RateLimited {
                reset_at,
                remaining,
            },
            ApiError::NotFound(what) => SyncError::NotFound(what),
            ApiError::Transport(msg) => SyncError::Api(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_classification() {
        let err: SyncError = ApiError::Auth("bad token".to_string()).into();
        assert_eq!(err.kind(), SyncErrorKind::Auth);

        let err: SyncError = ApiError::RateLimited {
            reset_at: Utc::now(),
            remaining: 3,
        }
        .into();
        assert_eq!(err.kind(), SyncErrorKind::RateLimited);
        assert!(err.reset_at().is_some());

        let err: SyncError = ApiError::Transport("boom".to_string()).into();
        assert_eq!(err.kind(), SyncErrorKind::Api);
        assert!(err.reset_at().is_none());
    }
}
