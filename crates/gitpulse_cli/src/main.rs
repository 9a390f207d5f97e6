//! Gitpulse CLI - command-line interface for the activity sync engine.

mod commands;
mod config;
mod progress;
mod shutdown;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::limits::OutputFormat;

#[derive(Parser)]
#[command(name = "gitpulse")]
#[command(version)]
#[command(about = "A local-first GitHub engineering-activity tracker")]
#[command(
    long_about = "Gitpulse incrementally syncs commits, pull requests, and reviews for a \
set of tracked GitHub repositories into a local SQLite database, staying \
inside the API rate-limit budget."
)]
#[command(after_long_help = r#"EXAMPLES
    Track a repository:
        $ gitpulse repo add rust-lang/rust

    Sync every tracked repository:
        $ gitpulse sync

    Sync one repository:
        $ gitpulse sync rust-lang/rust

    Show what has been synced:
        $ gitpulse status

    Check the remaining API budget:
        $ gitpulse limits

    Generate shell completions:
        $ gitpulse completions bash > ~/.local/share/bash-completion/completions/gitpulse

CONFIGURATION
    Gitpulse reads configuration from:
      1. ~/.config/gitpulse/config.toml (or $XDG_CONFIG_HOME/gitpulse/config.toml)
      2. ./gitpulse.toml in the current directory
      3. Environment variables (GITPULSE_* prefix)
      4. .env file in the current directory

ENVIRONMENT VARIABLES
    GITPULSE_DATABASE_URL     Database connection string (default: ~/.local/state/gitpulse/gitpulse.db)
    GITPULSE_GITHUB_TOKEN     GitHub personal access token
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Manage the tracked repository set
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },
    /// Sync tracked repositories from GitHub
    Sync {
        /// Repositories to sync (owner/name); syncs everything if omitted
        repos: Vec<String>,

        /// Commits fetched per page
        #[arg(long)]
        commit_page_size: Option<u32>,

        /// Pull requests fetched per page
        #[arg(long)]
        pr_page_size: Option<u32>,
    },
    /// Show sync coverage and recent runs
    Status {
        /// Number of recent runs to show
        #[arg(short = 'r', long, default_value_t = 5)]
        runs: u64,
    },
    /// Show current rate limit status
    Limits {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Manage credentials
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[derive(Subcommand)]
enum RepoAction {
    /// Track one or more repositories (owner/name)
    Add {
        /// Repositories to track
        #[arg(required = true)]
        repos: Vec<String>,
    },
    /// Stop tracking a repository and delete its synced data
    Rm {
        /// Repository to remove (owner/name)
        repo: String,
    },
    /// List tracked repositories
    Ls,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Save a GitHub personal access token to the config file
    SetToken {
        /// The token to save
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging when output is piped; progress bars own the
    // terminal otherwise.
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("gitpulse=info,gitpulse_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();

    let cli = Cli::parse();

    // Commands that don't touch the database.
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        Commands::Auth { action } => {
            let AuthAction::SetToken { token } = action;
            commands::auth::handle_set_token(token)?;
            return Ok(());
        }
        Commands::Limits { output } => {
            commands::limits::handle_limits(*output, &config).await?;
            return Ok(());
        }
        _ => {}
    }

    let database_url = config
        .database_url()
        .ok_or("Failed to determine database URL")?;

    // Ensure the database directory exists for SQLite.
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        // Strip query parameters (e.g., ?mode=rwc) before path operations
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Repo { action } => {
            commands::repo::handle_repo(action, &config, &database_url).await?;
        }
        Commands::Sync {
            repos,
            commit_page_size,
            pr_page_size,
        } => {
            commands::sync::handle_sync(
                repos,
                commit_page_size,
                pr_page_size,
                &config,
                &database_url,
            )
            .await?;
        }
        Commands::Status { runs } => {
            commands::status::handle_status(runs, &database_url).await?;
        }
        Commands::Auth { .. }
        | Commands::Limits { .. }
        | Commands::Completions { .. }
        | Commands::Man { .. } => {}
    }

    Ok(())
}
