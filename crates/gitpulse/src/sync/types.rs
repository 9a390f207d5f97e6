//! Shared sync types and constants.

/// Minimum remaining budget required before a run starts.
pub const PREFLIGHT_MIN_BUDGET: usize = 50;

/// Minimum remaining budget required at in-loop checkpoints.
pub const INLOOP_MIN_BUDGET: usize = 5;

/// How many detail fetches between in-loop budget checkpoints.
pub const BUDGET_CHECK_INTERVAL: usize = 10;

/// Minimum spacing between consecutive API requests, in milliseconds.
pub const REQUEST_SPACING_MS: u64 = 100;

/// Commits fetched per page.
pub const DEFAULT_COMMIT_PAGE_SIZE: u32 = 100;

/// Pull requests fetched per page.
pub const DEFAULT_PR_PAGE_SIZE: u32 = 50;

/// Emit a progress event every N commits ingested.
pub const COMMIT_PROGRESS_EVERY: usize = 20;

/// Emit a progress event every N pull requests ingested.
pub const PR_PROGRESS_EVERY: usize = 10;

/// Options for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Commits fetched per list page.
    pub commit_page_size: u32,
    /// Pull requests fetched per list page.
    pub pr_page_size: u32,
    /// Minimum spacing between consecutive API requests.
    pub request_spacing: std::time::Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            commit_page_size: DEFAULT_COMMIT_PAGE_SIZE,
            pr_page_size: DEFAULT_PR_PAGE_SIZE,
            request_spacing: std::time::Duration::from_millis(REQUEST_SPACING_MS),
        }
    }
}

/// Which tracked repositories a run should cover.
#[derive(Debug, Clone)]
pub enum SyncTargets {
    /// Every tracked repository.
    All,
    /// Tracked repositories by GitHub id.
    Ids(Vec<i64>),
    /// One tracked repository by `owner/name`.
    FullName(String),
}

/// Aggregate item counts across a whole run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTotals {
    pub commits: i64,
    pub pulls: i64,
    pub reviews: i64,
}

impl RunTotals {
    pub fn add(&mut self, counts: crate::store::sync_runs::RepoCounts) {
        self.commits += counts.commits;
        self.pulls += counts.pulls;
        self.reviews += counts.reviews;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_options_default() {
        let options = SyncOptions::default();
        assert_eq!(options.commit_page_size, DEFAULT_COMMIT_PAGE_SIZE);
        assert_eq!(options.pr_page_size, DEFAULT_PR_PAGE_SIZE);
    }
}
