//! Status command: sync coverage per repository plus recent run history.

use gitpulse::store::{stats, sync_runs};

use crate::commands::shared::connect_db;

pub(crate) async fn handle_status(
    runs: u64,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect_db(database_url).await?;

    let coverage = stats::coverage(&db).await?;
    if coverage.tracked == 0 {
        println!("No repositories tracked yet. Add one with: gitpulse repo add <owner/name>");
        return Ok(());
    }
    println!(
        "{} of {} tracked repositories have synced at least once.",
        coverage.synced, coverage.tracked
    );
    println!();

    let per_repo = stats::per_repo(&db).await?;
    let rows: Vec<RepoStatusRow> = per_repo.iter().map(RepoStatusRow::from_stats).collect();
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{}", table);

    let recent = sync_runs::recent(&db, runs).await?;
    if recent.is_empty() {
        println!("\nNo sync runs yet. Start one with: gitpulse sync");
        return Ok(());
    }

    println!("\nRecent runs:");
    let rows: Vec<RunRow> = recent.iter().map(RunRow::from_model).collect();
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{}", table);

    Ok(())
}

#[derive(tabled::Tabled)]
struct RepoStatusRow {
    #[tabled(rename = "Repository")]
    repository: String,
    #[tabled(rename = "Commits")]
    commits: u64,
    #[tabled(rename = "PRs")]
    pulls: u64,
    #[tabled(rename = "Merged")]
    merged: u64,
    #[tabled(rename = "Reviews")]
    reviews: u64,
    #[tabled(rename = "Last Synced")]
    last_synced: String,
}

impl RepoStatusRow {
    fn from_stats(s: &stats::RepoStats) -> Self {
        // The later of the two watermarks is the freshest activity we hold.
        let last_synced = s
            .state
            .as_ref()
            .and_then(|st| st.last_commit_sync.max(st.last_pr_sync))
            .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".to_string());

        Self {
            repository: s.repo.full_name(),
            commits: s.commits,
            pulls: s.pulls,
            merged: s.merged_pulls,
            reviews: s.reviews,
            last_synced,
        }
    }
}

#[derive(tabled::Tabled)]
struct RunRow {
    #[tabled(rename = "Run")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Repos")]
    repos: String,
    #[tabled(rename = "Commits")]
    commits: i64,
    #[tabled(rename = "PRs")]
    pulls: i64,
    #[tabled(rename = "Reviews")]
    reviews: i64,
    #[tabled(rename = "Error")]
    error: String,
}

impl RunRow {
    fn from_model(run: &gitpulse::SyncRunModel) -> Self {
        // Short run id prefix, the full UUID is noise in a table.
        let id = run.id.to_string().chars().take(8).collect();

        Self {
            id,
            status: run.status.to_string(),
            started: run.started_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            repos: format!("{}/{}", run.completed_repos, run.total_repos),
            commits: run.commits_synced,
            pulls: run.prs_synced,
            reviews: run.reviews_synced,
            error: run.error_message.clone().unwrap_or_default(),
        }
    }
}
