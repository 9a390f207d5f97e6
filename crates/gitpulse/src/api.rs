//! The remote API seam consumed by the sync engine.
//!
//! The engine is generic over [`ActivityApi`] so tests can script a fake
//! remote and the production [`crate::github::GitHubClient`] can stay a
//! thin wire adapter. All types here are normalized records, already
//! stripped of GitHub's response envelope.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::pr_state::PrState;

/// Errors surfaced by a remote API implementation.
///
/// The taxonomy the sync engine depends on: credential problems must be
/// distinguishable from rate-limit exhaustion, and both from generic
/// transport failures, because each gets different user-facing handling.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required credential missing, placeholder, or rejected (401).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Remote budget exhausted (403/429) or insufficient for the request.
    #[error("rate limit exceeded ({remaining} remaining, resets at {reset_at})")]
    RateLimited {
        reset_at: DateTime<Utc>,
        remaining: usize,
    },

    /// A named repository or resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other remote-call failure. Not retried, aborts the current run.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Snapshot of the remote rate-limit budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitInfo {
    /// Maximum requests in the current metering window.
    pub limit: usize,
    /// Requests remaining in the current metering window.
    pub remaining: usize,
    /// When the window resets.
    pub reset_at: DateTime<Utc>,
}

/// Identity of a remote repository, used when adding one to the tracked set.
#[derive(Debug, Clone)]
pub struct RemoteRepo {
    pub id: i64,
    pub owner: String,
    pub name: String,
}

/// One commit from the list endpoint. Line counts come separately from
/// the detail endpoint.
#[derive(Debug, Clone)]
pub struct CommitSummary {
    pub sha: String,
    pub author_login: Option<String>,
    pub author_email: Option<String>,
    pub message: String,
    pub committed_at: DateTime<Utc>,
}

/// Line-change counts from the commit detail endpoint.
#[derive(Debug, Clone, Copy)]
pub struct CommitDetail {
    pub additions: i32,
    pub deletions: i32,
}

/// One pull request from the list endpoint, sorted by update time
/// descending. Line counts come separately from the detail endpoint.
#[derive(Debug, Clone)]
pub struct PullSummary {
    pub id: i64,
    pub number: i64,
    pub author_login: Option<String>,
    pub title: String,
    pub state: PrState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Line-change counts from the pull request detail endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PullDetail {
    pub additions: i32,
    pub deletions: i32,
}

/// One review from the per-PR review list (unpaginated).
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub id: i64,
    pub reviewer_login: String,
    pub state: String,
    pub submitted_at: DateTime<Utc>,
}

/// The remote API contract the sync engine depends on.
///
/// Pagination is page-based and 1-indexed; a page shorter than `per_page`
/// (or empty) is the last page. Implementations do not retry: failures
/// propagate immediately to the caller.
#[async_trait]
pub trait ActivityApi: Send + Sync {
    /// Get the current rate-limit budget.
    async fn get_rate_limit(&self) -> Result<RateLimitInfo, ApiError>;

    /// Resolve a repository by owner and name.
    async fn get_repo(&self, owner: &str, name: &str) -> Result<RemoteRepo, ApiError>;

    /// List one page of commits, optionally bounded server-side by `since`.
    async fn list_commits(
        &self,
        owner: &str,
        name: &str,
        since: Option<DateTime<Utc>>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CommitSummary>, ApiError>;

    /// Fetch line-change counts for one commit.
    async fn get_commit(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<CommitDetail, ApiError>;

    /// List one page of pull requests (all states), sorted by update time
    /// descending. The descending order is what makes the engine's
    /// older-item short-circuit correct.
    async fn list_pulls(
        &self,
        owner: &str,
        name: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullSummary>, ApiError>;

    /// Fetch line-change counts for one pull request.
    async fn get_pull(
        &self,
        owner: &str,
        name: &str,
        number: i64,
    ) -> Result<PullDetail, ApiError>;

    /// List all reviews for one pull request. Reviews-per-PR is assumed
    /// small enough that this call is unpaginated.
    async fn list_reviews(
        &self,
        owner: &str,
        name: &str,
        number: i64,
    ) -> Result<Vec<ReviewRecord>, ApiError>;
}
