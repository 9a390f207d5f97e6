//! Tracked repository management.

use gitpulse::ActivityApi;
use gitpulse::store::{repos, sync_state};

use crate::RepoAction;
use crate::commands::shared::{connect_db, github_client, parse_full_name};
use crate::config::Config;

pub(crate) async fn handle_repo(
    action: RepoAction,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RepoAction::Add { repos } => handle_add(&repos, config, database_url).await,
        RepoAction::Rm { repo } => handle_rm(&repo, database_url).await,
        RepoAction::Ls => handle_ls(database_url).await,
    }
}

/// Track one or more repositories, resolving each against the remote
/// so the canonical id and casing land in the database.
async fn handle_add(
    repo_refs: &[String],
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect_db(database_url).await?;
    let client = github_client(config)?;

    let mut added = 0usize;
    let mut failed = 0usize;

    for repo_ref in repo_refs {
        let (owner, name) = match parse_full_name(repo_ref) {
            Ok(parts) => parts,
            Err(e) => {
                eprintln!("✗ {}", e);
                failed += 1;
                continue;
            }
        };

        if repos::find_by_name(&db, owner, name).await?.is_some() {
            println!("  {}/{} is already tracked", owner, name);
            continue;
        }

        match client.get_repo(owner, name).await {
            Ok(remote) => {
                let model = repos::insert(&db, &remote).await?;
                println!("✓ Tracking {}", model.full_name());
                added += 1;
            }
            Err(e) => {
                eprintln!("✗ {}/{}: {}", owner, name, e);
                failed += 1;
            }
        }
    }

    if repo_refs.len() > 1 {
        println!("Added {} repositories ({} failed).", added, failed);
    }
    if failed > 0 {
        return Err("some repositories could not be added".into());
    }
    Ok(())
}

/// Stop tracking a repository and delete everything synced for it.
async fn handle_rm(repo_ref: &str, database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (owner, name) = parse_full_name(repo_ref)?;
    let db = connect_db(database_url).await?;

    let repo = repos::find_by_name(&db, owner, name)
        .await?
        .ok_or_else(|| format!("Repository '{}/{}' is not tracked", owner, name))?;

    let full_name = repo.full_name();
    let deleted = repos::remove(&db, repo.id).await?;
    println!(
        "Removed {} ({} rows deleted, synced data included).",
        full_name, deleted
    );
    Ok(())
}

/// List tracked repositories with their last sync times.
async fn handle_ls(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect_db(database_url).await?;
    let repos = repos::list(&db).await?;

    if repos.is_empty() {
        println!("No repositories tracked yet. Add one with: gitpulse repo add <owner/name>");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(repos.len());
    for repo in repos {
        let state = sync_state::get(&db, repo.id).await?;
        rows.push(RepoRow {
            repository: repo.full_name(),
            added: repo.added_at.format("%Y-%m-%d").to_string(),
            last_commit_sync: format_watermark(state.as_ref().and_then(|s| s.last_commit_sync)),
            last_pr_sync: format_watermark(state.as_ref().and_then(|s| s.last_pr_sync)),
        });
    }

    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{}", table);
    Ok(())
}

#[derive(tabled::Tabled)]
struct RepoRow {
    #[tabled(rename = "Repository")]
    repository: String,
    #[tabled(rename = "Added")]
    added: String,
    #[tabled(rename = "Commits Synced")]
    last_commit_sync: String,
    #[tabled(rename = "PRs Synced")]
    last_pr_sync: String,
}

fn format_watermark(ts: Option<sea_orm::prelude::DateTimeWithTimeZone>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "never".to_string(),
    }
}
