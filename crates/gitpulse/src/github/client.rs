//! GitHub API client implementing the [`ActivityApi`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use octocrab::Octocrab;
use serde::Serialize;

use crate::api::{
    ActivityApi, ApiError, CommitDetail, CommitSummary, PullDetail, PullSummary, RateLimitInfo,
    RemoteRepo, ReviewRecord,
};

use super::convert::{to_commit_summary, to_pull_summary, to_remote_repo, to_review_record};
use super::error::{GitHubError, is_placeholder_token, map_api_error};
use super::types::{
    CommitDetailResponse, CommitListItem, PullDetailResponse, PullListItem, RepoResponse,
    ReviewResponse,
};

/// Authenticated GitHub client.
///
/// Wraps an `Octocrab` instance and exposes exactly the endpoints the
/// sync engine needs, with responses normalized into the `api` record
/// types. Cheap to clone; the inner client is shared.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
}

#[derive(Serialize)]
struct CommitListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<String>,
    page: u32,
    per_page: u32,
}

#[derive(Serialize)]
struct PullListParams {
    state: &'static str,
    sort: &'static str,
    direction: &'static str,
    page: u32,
    per_page: u32,
}

impl GitHubClient {
    /// Create an authenticated client from a personal access token.
    ///
    /// Fails fast with [`GitHubError::InvalidToken`] for a missing or
    /// placeholder token, before any request is made.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        if is_placeholder_token(token) {
            return Err(GitHubError::InvalidToken(
                "token is missing or a placeholder; set github.token in the config \
                 or the GITPULSE_GITHUB_TOKEN environment variable"
                    .to_string(),
            ));
        }

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(GitHubError::Api)?;

        Ok(Self {
            inner: Arc::new(client),
        })
    }

    /// Create a client from an existing Octocrab instance.
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    /// Get a reference to the inner Octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.inner
    }
}

#[async_trait]
impl ActivityApi for GitHubClient {
    async fn get_rate_limit(&self) -> Result<RateLimitInfo, ApiError> {
        let rate_limit = self
            .inner
            .ratelimit()
            .get()
            .await
            .map_err(|e| map_api_error("rate limit", e))?;
        let core = &rate_limit.resources.core;

        Ok(RateLimitInfo {
            limit: core.limit,
            remaining: core.remaining,
            reset_at: DateTime::from_timestamp(core.reset as i64, 0).unwrap_or_else(Utc::now),
        })
    }

    async fn get_repo(&self, owner: &str, name: &str) -> Result<RemoteRepo, ApiError> {
        let route = format!("/repos/{owner}/{name}");
        let raw: RepoResponse = self
            .inner
            .get(&route, None::<&()>)
            .await
            .map_err(|e| map_api_error(&format!("repository {owner}/{name}"), e))?;

        Ok(to_remote_repo(raw))
    }

    async fn list_commits(
        &self,
        owner: &str,
        name: &str,
        since: Option<DateTime<Utc>>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CommitSummary>, ApiError> {
        let route = format!("/repos/{owner}/{name}/commits");
        let params = CommitListParams {
            since: since.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            page,
            per_page,
        };

        let raw: Vec<CommitListItem> = self
            .inner
            .get(&route, Some(&params))
            .await
            .map_err(|e| map_api_error(&format!("commits for {owner}/{name}"), e))?;

        Ok(raw.into_iter().map(to_commit_summary).collect())
    }

    async fn get_commit(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<CommitDetail, ApiError> {
        let route = format!("/repos/{owner}/{name}/commits/{sha}");
        let raw: CommitDetailResponse = self
            .inner
            .get(&route, None::<&()>)
            .await
            .map_err(|e| map_api_error(&format!("commit {sha}"), e))?;

        Ok(CommitDetail {
            additions: raw.stats.additions as i32,
            deletions: raw.stats.deletions as i32,
        })
    }

    async fn list_pulls(
        &self,
        owner: &str,
        name: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullSummary>, ApiError> {
        let route = format!("/repos/{owner}/{name}/pulls");
        // `sort=updated direction=desc` is load-bearing: the engine's
        // incremental short-circuit relies on this ordering.
        let params = PullListParams {
            state: "all",
            sort: "updated",
            direction: "desc",
            page,
            per_page,
        };

        let raw: Vec<PullListItem> = self
            .inner
            .get(&route, Some(&params))
            .await
            .map_err(|e| map_api_error(&format!("pull requests for {owner}/{name}"), e))?;

        raw.into_iter().map(to_pull_summary).collect()
    }

    async fn get_pull(&self, owner: &str, name: &str, number: i64) -> Result<PullDetail, ApiError> {
        let route = format!("/repos/{owner}/{name}/pulls/{number}");
        let raw: PullDetailResponse = self
            .inner
            .get(&route, None::<&()>)
            .await
            .map_err(|e| map_api_error(&format!("pull request #{number}"), e))?;

        Ok(PullDetail {
            additions: raw.additions as i32,
            deletions: raw.deletions as i32,
        })
    }

    async fn list_reviews(
        &self,
        owner: &str,
        name: &str,
        number: i64,
    ) -> Result<Vec<ReviewRecord>, ApiError> {
        let route = format!("/repos/{owner}/{name}/pulls/{number}/reviews");
        let raw: Vec<ReviewResponse> = self
            .inner
            .get(&route, None::<&()>)
            .await
            .map_err(|e| map_api_error(&format!("reviews for pull request #{number}"), e))?;

        Ok(raw.into_iter().filter_map(to_review_record).collect())
    }
}
