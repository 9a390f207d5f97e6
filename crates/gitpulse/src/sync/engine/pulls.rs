//! Pull request and review phase of a repository sync cycle.

use chrono::Utc;

use crate::api::ActivityApi;
use crate::store::{pull_requests, reviews, sync_state};
use crate::sync::error::SyncError;
use crate::sync::progress::SyncEvent;
use crate::sync::types::{BUDGET_CHECK_INTERVAL, INLOOP_MIN_BUDGET, PR_PROGRESS_EVERY};

use super::RepoCycle;

/// Fetch and persist pull requests updated since the repository's PR
/// watermark, with each PR's reviews. Returns (pulls, reviews) counts.
///
/// The list endpoint cannot filter by update time server-side, so pages
/// arrive sorted by update time descending and the loop stops at the
/// first item strictly older than the watermark: everything after it on
/// this and later pages is older still. Each kept PR costs one detail
/// request for line counts and one review-list request.
pub(super) async fn sync_pulls<A: ActivityApi>(
    cycle: &RepoCycle<'_, A>,
) -> Result<(i64, i64), SyncError> {
    let cycle_start = Utc::now();
    let since = sync_state::get(cycle.db, cycle.repo.id)
        .await?
        .and_then(|s| s.last_pr_sync)
        .map(|t| t.with_timezone(&Utc));

    let owner = &cycle.repo.owner;
    let name = &cycle.repo.name;
    let per_page = cycle.options.pr_page_size;
    let mut pulls: i64 = 0;
    let mut total_reviews: i64 = 0;
    let mut page: u32 = 1;

    'pages: loop {
        if cycle.cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        cycle
            .governor
            .ensure_budget(cycle.api, INLOOP_MIN_BUDGET)
            .await?;

        cycle.governor.pace().await;
        let batch = cycle.api.list_pulls(owner, name, page, per_page).await?;
        let batch_len = batch.len();

        for summary in batch {
            if cycle.cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            // Strictly older than the watermark; an item exactly at it
            // is still kept.
            if let Some(since) = since {
                if summary.updated_at < since {
                    break 'pages;
                }
            }
            if pulls > 0 && pulls as usize % BUDGET_CHECK_INTERVAL == 0 {
                cycle
                    .governor
                    .ensure_budget(cycle.api, INLOOP_MIN_BUDGET)
                    .await?;
            }

            cycle.governor.pace().await;
            let detail = cycle.api.get_pull(owner, name, summary.number).await?;
            pull_requests::upsert(cycle.db, cycle.repo.id, &summary, detail).await?;

            cycle.governor.pace().await;
            let records = cycle.api.list_reviews(owner, name, summary.number).await?;
            for record in &records {
                reviews::upsert(cycle.db, summary.id, record).await?;
            }
            total_reviews += records.len() as i64;

            pulls += 1;
            if pulls as usize % PR_PROGRESS_EVERY == 0 {
                cycle.progress.emit(SyncEvent::Progress {
                    full_name: cycle.repo.full_name(),
                    message: format!("{} pull requests", pulls),
                });
            }
        }

        if batch_len < per_page as usize {
            break;
        }
        page += 1;
    }

    sync_state::set_pr_watermark(cycle.db, cycle.repo.id, cycle_start).await?;
    Ok((pulls, total_reviews))
}
