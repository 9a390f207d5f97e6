//! Conversion from raw GitHub response shapes into normalized records.

use chrono::Utc;

use crate::api::{ApiError, CommitSummary, PullSummary, RemoteRepo, ReviewRecord};
use crate::entity::pr_state::PrState;

use super::types::{CommitListItem, PullListItem, RepoResponse, ReviewResponse};

pub fn to_remote_repo(raw: RepoResponse) -> RemoteRepo {
    RemoteRepo {
        id: raw.id,
        owner: raw.owner.login,
        name: raw.name,
    }
}

pub fn to_commit_summary(raw: CommitListItem) -> CommitSummary {
    let (email, date) = match raw.commit.author {
        Some(sig) => (sig.email, sig.date),
        // Commits without signature metadata are rare but representable;
        // fall back to "now" rather than dropping the commit.
        None => (None, Utc::now()),
    };

    CommitSummary {
        sha: raw.sha,
        author_login: raw.author.map(|a| a.login),
        author_email: email,
        message: raw.commit.message,
        committed_at: date,
    }
}

pub fn to_pull_summary(raw: PullListItem) -> Result<PullSummary, ApiError> {
    let state: PrState = raw
        .state
        .parse()
        .map_err(|e: String| ApiError::Transport(e))?;

    Ok(PullSummary {
        id: raw.id,
        number: raw.number,
        author_login: raw.user.map(|u| u.login),
        title: raw.title,
        state,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        merged_at: raw.merged_at,
        closed_at: raw.closed_at,
    })
}

/// Convert a raw review, skipping pending (unsubmitted) reviews and
/// reviews whose author account no longer resolves.
pub fn to_review_record(raw: ReviewResponse) -> Option<ReviewRecord> {
    let submitted_at = raw.submitted_at?;
    let reviewer = raw.user?;

    Some(ReviewRecord {
        id: raw.id,
        reviewer_login: reviewer.login,
        state: raw.state,
        submitted_at,
    })
}
