//! GitHub API error types and mapping into the engine's taxonomy.

use chrono::Utc;
use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// The configured token is missing or an obvious placeholder.
    /// Detected before any request is made.
    #[error("invalid GitHub token: {0}")]
    InvalidToken(String),
}

/// Map an octocrab error into the engine's [`ApiError`] taxonomy.
///
/// `resource` names what was being fetched, for NotFound messages.
pub fn map_api_error(resource: &str, e: octocrab::Error) -> ApiError {
    match &e {
        octocrab::Error::GitHub { source, .. } => {
            classify_status(source.status_code.as_u16(), &source.message, resource)
        }
        // Empty response body (EOF) often indicates rate limiting.
        octocrab::Error::Json { .. } => ApiError::RateLimited {
            reset_at: Utc::now(),
            remaining: 0,
        },
        _ => ApiError::Transport(e.to_string()),
    }
}

/// Classify a GitHub error response by HTTP status.
fn classify_status(status: u16, message: &str, resource: &str) -> ApiError {
    match status {
        401 => ApiError::Auth(message.to_string()),
        403 | 429 => ApiError::RateLimited {
            // The error body carries no reset header; callers that
            // need an accurate reset time query /rate_limit.
            reset_at: Utc::now(),
            remaining: 0,
        },
        404 => ApiError::NotFound(resource.to_string()),
        _ => ApiError::Transport(format!("GitHub returned {status}: {message}")),
    }
}

impl From<GitHubError> for ApiError {
    fn from(e: GitHubError) -> Self {
        match e {
            GitHubError::Api(inner) => map_api_error("request", inner),
            GitHubError::InvalidToken(msg) => ApiError::Auth(msg),
        }
    }
}

/// Whether a token is usable at all: non-empty and not an obvious
/// placeholder left over from a config template.
pub fn is_placeholder_token(token: &str) -> bool {
    let trimmed = token.trim();
    trimmed.is_empty()
        || trimmed.contains('<')
        || trimmed.to_ascii_lowercase().contains("your_token")
        || trimmed.eq_ignore_ascii_case("changeme")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_tokens_rejected() {
        assert!(is_placeholder_token(""));
        assert!(is_placeholder_token("   "));
        assert!(is_placeholder_token("<paste token here>"));
        assert!(is_placeholder_token("ghp_YOUR_TOKEN_HERE"));
        assert!(is_placeholder_token("changeme"));
    }

    #[test]
    fn test_real_looking_token_accepted() {
        assert!(!is_placeholder_token("ghp_16charsofentropy0000"));
    }

    #[test]
    fn test_invalid_token_maps_to_auth_error() {
        let err: ApiError = GitHubError::InvalidToken("placeholder".to_string()).into();
        assert!(matches!(err, ApiError::Auth(_)));
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            classify_status(401, "bad credentials", "commits"),
            ApiError::Auth(_)
        ));
        assert!(matches!(
            classify_status(403, "rate limit exceeded", "commits"),
            ApiError::RateLimited { remaining: 0, .. }
        ));
        assert!(matches!(
            classify_status(429, "too many requests", "commits"),
            ApiError::RateLimited { .. }
        ));
        assert!(matches!(
            classify_status(404, "not found", "repository acme/widgets"),
            ApiError::NotFound(resource) if resource == "repository acme/widgets"
        ));
        assert!(matches!(
            classify_status(500, "server error", "commits"),
            ApiError::Transport(_)
        ));
    }
}
