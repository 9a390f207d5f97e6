//! Helpers shared between commands.

use gitpulse::github::GitHubClient;
use sea_orm::DatabaseConnection;

use crate::config::Config;

/// Connect to the database, applying any pending migrations.
///
/// Commands that read or write synced data go through this so a fresh
/// install works without an explicit `gitpulse migrate up`.
pub(crate) async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn std::error::Error>> {
    Ok(gitpulse::connect_and_migrate(database_url).await?)
}

/// Build a GitHub client from the configured token.
pub(crate) fn github_client(config: &Config) -> Result<GitHubClient, Box<dyn std::error::Error>> {
    let token = config.github_token().ok_or(
        "No GitHub token configured. Set one with: gitpulse auth set-token <TOKEN>\n\
         (or set the GITPULSE_GITHUB_TOKEN environment variable)",
    )?;

    Ok(GitHubClient::new(&token)?)
}

/// Split an `owner/name` repository reference.
pub(crate) fn parse_full_name(full_name: &str) -> Result<(&str, &str), Box<dyn std::error::Error>> {
    match full_name.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok((owner, name)),
        _ => Err(format!(
            "Invalid repository reference '{}'. Expected owner/name, e.g., rust-lang/rust",
            full_name
        )
        .into()),
    }
}
