//! Raw GitHub REST response shapes.
//!
//! Only the fields the sync engine consumes are deserialized; everything
//! else in the response body is ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET /repos/{owner}/{repo}`.
#[derive(Debug, Deserialize)]
pub struct RepoResponse {
    pub id: i64,
    pub name: String,
    pub owner: ActorRef,
}

/// A user reference as embedded in list responses. GitHub reports `null`
/// for unattributed actors, so containers hold `Option<ActorRef>`.
#[derive(Debug, Deserialize)]
pub struct ActorRef {
    pub login: String,
}

/// One element of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Deserialize)]
pub struct CommitListItem {
    pub sha: String,
    pub commit: CommitMeta,
    /// The GitHub account attribution; null when the commit email does
    /// not map to an account.
    pub author: Option<ActorRef>,
}

#[derive(Debug, Deserialize)]
pub struct CommitMeta {
    pub message: String,
    pub author: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
pub struct CommitSignature {
    pub email: Option<String>,
    pub date: DateTime<Utc>,
}

/// `GET /repos/{owner}/{repo}/commits/{sha}` - only the stats block.
#[derive(Debug, Deserialize)]
pub struct CommitDetailResponse {
    pub stats: ChangeStats,
}

#[derive(Debug, Deserialize, Default)]
pub struct ChangeStats {
    #[serde(default)]
    pub additions: i64,
    #[serde(default)]
    pub deletions: i64,
}

/// One element of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Deserialize)]
pub struct PullListItem {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub state: String,
    pub user: Option<ActorRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// `GET /repos/{owner}/{repo}/pulls/{number}` - only the line counts.
#[derive(Debug, Deserialize)]
pub struct PullDetailResponse {
    #[serde(default)]
    pub additions: i64,
    #[serde(default)]
    pub deletions: i64,
}

/// One element of `GET /repos/{owner}/{repo}/pulls/{number}/reviews`.
///
/// Pending (unsubmitted) reviews have no `submitted_at` and are skipped
/// during conversion.
#[derive(Debug, Deserialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub user: Option<ActorRef>,
    pub state: String,
    pub submitted_at: Option<DateTime<Utc>>,
}
