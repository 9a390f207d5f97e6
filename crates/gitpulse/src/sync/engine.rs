//! The sync engine: run lifecycle, target resolution, and per-repository
//! sequencing.
//!
//! A run is started with [`SyncEngine::start`], which validates the
//! target set, takes the run lock, and spawns the run as a background
//! task. The caller gets the run id and the receiving half of the
//! progress stream; the run itself survives a dropped receiver.
//!
//! Repositories are processed strictly one at a time. Within one
//! repository, commits sync first, then pull requests with their
//! reviews. Each phase advances its own watermark only after it
//! completes, so a failure mid-run never causes data to be skipped on
//! the next attempt.

mod commits;
mod pulls;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::ActivityApi;
use crate::entity::prelude::*;
use crate::entity::sync_status::SyncStatus;
use crate::store::sync_runs::{self, RepoCounts};
use crate::store::repos;

use super::error::SyncError;
use super::governor::RateLimitGovernor;
use super::progress::{ProgressSender, SyncEvent};
use super::types::{PREFLIGHT_MIN_BUDGET, RunTotals, SyncOptions, SyncTargets};

/// Everything one repository's sync cycle needs, bundled so the phase
/// functions stay readable.
pub(super) struct RepoCycle<'a, A> {
    pub api: &'a A,
    pub db: &'a DatabaseConnection,
    pub governor: &'a RateLimitGovernor,
    pub options: &'a SyncOptions,
    pub progress: &'a ProgressSender,
    pub cancel: &'a CancellationToken,
    pub repo: &'a RepositoryModel,
}

/// Orchestrates sync runs over any [`ActivityApi`] implementation.
pub struct SyncEngine<A> {
    api: Arc<A>,
    db: Arc<DatabaseConnection>,
    options: SyncOptions,
    governor: RateLimitGovernor,
    run_lock: Arc<Semaphore>,
}

impl<A> SyncEngine<A>
where
    A: ActivityApi + 'static,
{
    pub fn new(api: A, db: DatabaseConnection, options: SyncOptions) -> Self {
        let governor = RateLimitGovernor::with_spacing(options.request_spacing);
        Self {
            api: Arc::new(api),
            db: Arc::new(db),
            options,
            governor,
            // One permit: at most one run at a time per engine.
            run_lock: Arc::new(Semaphore::new(1)),
        }
    }

    /// Start a sync run over the given targets.
    ///
    /// Validation happens before anything is spawned or recorded:
    /// a held run lock, an empty target set, or an untracked named
    /// target all return an error with no run row and no events.
    /// On success the run proceeds in the background and its lifetime
    /// is observable through the returned event stream.
    pub async fn start(
        &self,
        targets: SyncTargets,
        cancel: CancellationToken,
    ) -> Result<(Uuid, mpsc::UnboundedReceiver<SyncEvent>), SyncError> {
        let permit = self
            .run_lock
            .clone()
            .try_acquire_owned()
            .map_err(|_| SyncError::AlreadyRunning)?;

        let targets = resolve_targets(&self.db, &targets).await?;
        if targets.is_empty() {
            return Err(SyncError::EmptyTargetSet);
        }

        let run_id = Uuid::new_v4();
        let (progress, rx) = ProgressSender::channel();

        let api = Arc::clone(&self.api);
        let db = self.db.clone();
        let options = self.options.clone();
        let governor = self.governor.clone();

        tokio::spawn(async move {
            // Held for the duration of the run; dropping it on any exit
            // path releases the run lock.
            let _permit = permit;
            run(run_id, api, db, options, governor, targets, progress, cancel).await;
        });

        Ok((run_id, rx))
    }
}

/// Resolve a target specification against the tracked set.
async fn resolve_targets(
    db: &DatabaseConnection,
    targets: &SyncTargets,
) -> Result<Vec<RepositoryModel>, SyncError> {
    match targets {
        SyncTargets::All => Ok(repos::list(db).await?),
        SyncTargets::Ids(ids) => {
            let mut out = Vec::with_capacity(ids.len());
            for id in ids {
                let repo = repos::find_by_id(db, *id)
                    .await?
                    .ok_or_else(|| SyncError::NotTracked(format!("id={}", id)))?;
                out.push(repo);
            }
            Ok(out)
        }
        SyncTargets::FullName(full_name) => {
            let (owner, name) = full_name
                .split_once('/')
                .ok_or_else(|| SyncError::NotTracked(full_name.clone()))?;
            let repo = repos::find_by_name(db, owner, name)
                .await?
                .ok_or_else(|| SyncError::NotTracked(full_name.clone()))?;
            Ok(vec![repo])
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run<A: ActivityApi>(
    run_id: Uuid,
    api: Arc<A>,
    db: Arc<DatabaseConnection>,
    options: SyncOptions,
    governor: RateLimitGovernor,
    targets: Vec<RepositoryModel>,
    progress: ProgressSender,
    cancel: CancellationToken,
) {
    let total = targets.len();

    // The run row exists before preflight so a run stopped at the gate
    // still lands in history.
    if let Err(e) = sync_runs::create(&db, run_id, total as i32).await {
        fail_run(&db, run_id, &progress, SyncError::Store(e), 0).await;
        return;
    }

    let budget = match governor
        .ensure_budget(api.as_ref(), PREFLIGHT_MIN_BUDGET)
        .await
    {
        Ok(info) => info,
        Err(e) => {
            fail_run(&db, run_id, &progress, e, 0).await;
            return;
        }
    };

    info!(
        %run_id,
        total_repos = total,
        budget_remaining = budget.remaining,
        "starting sync run"
    );
    progress.emit(SyncEvent::Start {
        run_id,
        total_repos: total,
        budget_remaining: budget.remaining,
        budget_limit: budget.limit,
    });

    let mut totals = RunTotals::default();
    let mut completed = 0usize;

    for (idx, repo) in targets.iter().enumerate() {
        if cancel.is_cancelled() {
            fail_run(&db, run_id, &progress, SyncError::Cancelled, completed).await;
            return;
        }

        let full_name = repo.full_name();
        progress.emit(SyncEvent::RepoStart {
            index: idx + 1,
            total,
            full_name: full_name.clone(),
        });

        let cycle = RepoCycle {
            api: api.as_ref(),
            db: &db,
            governor: &governor,
            options: &options,
            progress: &progress,
            cancel: &cancel,
            repo,
        };

        let counts = match sync_repo(&cycle).await {
            Ok(counts) => counts,
            Err(e) => {
                fail_run(&db, run_id, &progress, e, completed).await;
                return;
            }
        };

        if let Err(e) = sync_runs::record_repo_done(&db, run_id, counts).await {
            fail_run(&db, run_id, &progress, SyncError::Store(e), completed).await;
            return;
        }

        totals.add(counts);
        completed += 1;
        info!(
            %run_id,
            repo = %full_name,
            commits = counts.commits,
            pulls = counts.pulls,
            reviews = counts.reviews,
            "repository synced"
        );
        progress.emit(SyncEvent::RepoDone {
            full_name,
            commits: counts.commits,
            pulls: counts.pulls,
            reviews: counts.reviews,
        });
    }

    if let Err(e) = sync_runs::finalize(&db, run_id, SyncStatus::Complete, None).await {
        warn!(%run_id, error = %e, "failed to finalize completed run");
    }
    info!(%run_id, completed_repos = completed, "sync run complete");
    progress.emit(SyncEvent::Complete {
        run_id,
        total_repos: total,
        commits: totals.commits,
        pulls: totals.pulls,
        reviews: totals.reviews,
    });
}

/// Sync one repository: commits first, then pull requests with reviews.
async fn sync_repo<A: ActivityApi>(cycle: &RepoCycle<'_, A>) -> Result<RepoCounts, SyncError> {
    let commits = commits::sync_commits(cycle).await?;
    let (pulls, reviews) = pulls::sync_pulls(cycle).await?;
    Ok(RepoCounts {
        commits,
        pulls,
        reviews,
    })
}

/// Finalize a failed, partial, or cancelled run and emit the terminal
/// error event.
async fn fail_run(
    db: &DatabaseConnection,
    run_id: Uuid,
    progress: &ProgressSender,
    err: SyncError,
    completed: usize,
) {
    let status = match err {
        SyncError::Cancelled => SyncStatus::Cancelled,
        _ if completed > 0 => SyncStatus::Partial,
        _ => SyncStatus::Error,
    };

    warn!(%run_id, status = %status, error = %err, "sync run stopped");
    if let Err(e) = sync_runs::finalize(db, run_id, status, Some(err.to_string())).await {
        warn!(%run_id, error = %e, "failed to finalize stopped run");
    }

    progress.emit(SyncEvent::Error {
        run_id,
        kind: err.kind(),
        message: err.to_string(),
        completed_repos: completed,
        reset_at: err.reset_at(),
    });
}
