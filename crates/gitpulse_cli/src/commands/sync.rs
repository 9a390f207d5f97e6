//! Sync command: drive a full engine run and render its progress.

use gitpulse::store::repos;
use gitpulse::sync::{SyncEngine, SyncError, SyncEvent, SyncOptions, SyncTargets};

use crate::commands::shared::{connect_db, github_client, parse_full_name};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown;

pub(crate) async fn handle_sync(
    repo_refs: Vec<String>,
    commit_page_size: Option<u32>,
    pr_page_size: Option<u32>,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect_db(database_url).await?;
    let client = github_client(config)?;

    let options = SyncOptions {
        commit_page_size: commit_page_size.unwrap_or(config.sync.commit_page_size),
        pr_page_size: pr_page_size.unwrap_or(config.sync.pr_page_size),
        ..SyncOptions::default()
    };

    // Named targets are resolved here so a typo fails before the engine
    // takes the run lock.
    let targets = if repo_refs.is_empty() {
        SyncTargets::All
    } else {
        let mut ids = Vec::with_capacity(repo_refs.len());
        for repo_ref in &repo_refs {
            let (owner, name) = parse_full_name(repo_ref)?;
            let repo = repos::find_by_name(&db, owner, name).await?.ok_or_else(|| {
                format!(
                    "Repository '{}' is not tracked. Add it with: gitpulse repo add {}",
                    repo_ref, repo_ref
                )
            })?;
            ids.push(repo.id);
        }
        SyncTargets::Ids(ids)
    };

    let cancel = shutdown::setup_shutdown_handler();
    let engine = SyncEngine::new(client, db, options);

    let (run_id, mut events) = match engine.start(targets, cancel).await {
        Ok(started) => started,
        Err(SyncError::AlreadyRunning) => {
            return Err("A sync run is already in progress.".into());
        }
        Err(SyncError::EmptyTargetSet) => {
            return Err(
                "No repositories to sync. Track one with: gitpulse repo add <owner/name>".into(),
            );
        }
        Err(SyncError::NotTracked(name)) => {
            return Err(format!(
                "Repository '{}' is not tracked. Add it with: gitpulse repo add {}",
                name, name
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(%run_id, "Sync run started");

    let reporter = ProgressReporter::new();
    let mut failed = false;

    while let Some(event) = events.recv().await {
        if matches!(event, SyncEvent::Error { .. }) {
            failed = true;
        }
        reporter.handle(&event);
    }

    if failed {
        return Err(format!(
            "Sync run {} did not complete. See `gitpulse status` for details.",
            run_id
        )
        .into());
    }
    Ok(())
}
