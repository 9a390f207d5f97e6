//! Commit phase of a repository sync cycle.

use chrono::Utc;

use crate::api::ActivityApi;
use crate::store::{commits, sync_state};
use crate::sync::error::SyncError;
use crate::sync::progress::SyncEvent;
use crate::sync::types::{BUDGET_CHECK_INTERVAL, COMMIT_PROGRESS_EVERY, INLOOP_MIN_BUDGET};

use super::RepoCycle;

/// Fetch and persist commits newer than the repository's commit
/// watermark. Returns the number of commits ingested.
///
/// The window is bounded server-side via `since`, so already-synced
/// history is never re-downloaded. Each commit costs one detail request
/// for its line counts and is persisted immediately; a failure partway
/// through loses nothing already written. The watermark advances to the
/// cycle start time, and only after every page has landed.
pub(super) async fn sync_commits<A: ActivityApi>(
    cycle: &RepoCycle<'_, A>,
) -> Result<i64, SyncError> {
    let cycle_start = Utc::now();
    let since = sync_state::get(cycle.db, cycle.repo.id)
        .await?
        .and_then(|s| s.last_commit_sync)
        .map(|t| t.with_timezone(&Utc));

    let owner = &cycle.repo.owner;
    let name = &cycle.repo.name;
    let per_page = cycle.options.commit_page_size;
    let mut synced: i64 = 0;
    let mut page: u32 = 1;

    loop {
        if cycle.cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        cycle
            .governor
            .ensure_budget(cycle.api, INLOOP_MIN_BUDGET)
            .await?;

        cycle.governor.pace().await;
        let batch = cycle
            .api
            .list_commits(owner, name, since, page, per_page)
            .await?;
        let batch_len = batch.len();

        for summary in batch {
            if cycle.cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            if synced > 0 && synced as usize % BUDGET_CHECK_INTERVAL == 0 {
                cycle
                    .governor
                    .ensure_budget(cycle.api, INLOOP_MIN_BUDGET)
                    .await?;
            }

            cycle.governor.pace().await;
            let detail = cycle.api.get_commit(owner, name, &summary.sha).await?;
            commits::upsert(cycle.db, cycle.repo.id, &summary, detail).await?;

            synced += 1;
            if synced as usize % COMMIT_PROGRESS_EVERY == 0 {
                cycle.progress.emit(SyncEvent::Progress {
                    full_name: cycle.repo.full_name(),
                    message: format!("{} commits", synced),
                });
            }
        }

        if batch_len < per_page as usize {
            break;
        }
        page += 1;
    }

    sync_state::set_commit_watermark(cycle.db, cycle.repo.id, cycle_start).await?;
    Ok(synced)
}
