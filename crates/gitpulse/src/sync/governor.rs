//! Request pacing and rate-limit budget enforcement.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use crate::api::{ActivityApi, RateLimitInfo};

use super::error::SyncError;
use super::types::REQUEST_SPACING_MS;

/// Type alias for the governor rate limiter.
type PacingLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Paces outgoing requests and guards the remaining API budget.
///
/// Two separate concerns:
/// - [`pace`](Self::pace) enforces a minimum spacing between consecutive
///   requests, awaited before every API call the engine makes.
/// - [`ensure_budget`](Self::ensure_budget) queries the remote budget
///   and fails the run before it can strand a repository mid-fetch with
///   nothing left to spend.
#[derive(Clone)]
pub struct RateLimitGovernor {
    pacer: Arc<PacingLimiter>,
}

impl RateLimitGovernor {
    /// Create a governor with the default request spacing.
    pub fn new() -> Self {
        Self::with_spacing(Duration::from_millis(REQUEST_SPACING_MS))
    }

    /// Create a governor with custom request spacing.
    pub fn with_spacing(spacing: Duration) -> Self {
        let quota = Quota::with_period(spacing)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::new(10).unwrap()));
        Self {
            pacer: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Wait until the next request is allowed.
    pub async fn pace(&self) {
        self.pacer.until_ready().await;
    }

    /// Check that at least `min_remaining` budget is left.
    ///
    /// Returns the current budget snapshot on success, or
    /// [`SyncError::RateLimited`] carrying the reset time when the
    /// budget has dropped below the threshold.
    pub async fn ensure_budget<A: ActivityApi + ?Sized>(
        &self,
        api: &A,
        min_remaining: usize,
    ) -> Result<RateLimitInfo, SyncError> {
        let info = api.get_rate_limit().await?;
        if info.remaining < min_remaining {
            return Err(SyncError::RateLimited {
                reset_at: info.reset_at,
                remaining: info.remaining,
            });
        }
        Ok(info)
    }
}

impl Default for RateLimitGovernor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_pace_enforces_spacing() {
        let governor = RateLimitGovernor::with_spacing(Duration::from_millis(20));

        let start = Instant::now();
        governor.pace().await;
        governor.pace().await;
        governor.pace().await;

        // First call is immediate, the next two each wait the spacing.
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
