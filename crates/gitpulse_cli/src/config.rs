//! Configuration file support for gitpulse.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GITPULSE_`, e.g., `GITPULSE_GITHUB_TOKEN`)
//! 3. Config file (~/.config/gitpulse/config.toml or ./gitpulse.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/gitpulse/gitpulse.db`
//! on Linux (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/gitpulse/gitpulse.db"  # optional, this is the default
//!
//! [github]
//! token = "ghp_..."  # or use GITPULSE_GITHUB_TOKEN env var
//!
//! [sync]
//! commit_page_size = 100
//! pr_page_size = 50
//! ```

use std::path::PathBuf;
use std::{fs, io};

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Defaults to `sqlite://~/.local/state/gitpulse/gitpulse.db` if not specified.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via GITPULSE_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Commits fetched per page.
    pub commit_page_size: u32,
    /// Pull requests fetched per page.
    pub pr_page_size: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            commit_page_size: gitpulse::sync::DEFAULT_COMMIT_PAGE_SIZE,
            pr_page_size: gitpulse::sync::DEFAULT_PR_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/gitpulse/config.toml)
    /// 3. Local config file (./gitpulse.toml)
    /// 4. Environment variables with GITPULSE_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "gitpulse") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        // Local config file takes priority over the XDG one.
        let local_config = PathBuf::from("gitpulse.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./gitpulse.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., GITPULSE_DATABASE_URL -> database.url
        builder = builder.add_source(
            Environment::with_prefix("GITPULSE")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter enables read-write access and creates the
    /// file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("gitpulse.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Get the GitHub token.
    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone()
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gitpulse").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/gitpulse` or `~/.local/state/gitpulse`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gitpulse").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }

    /// Save a GitHub token to the config file.
    ///
    /// Creates the config file and parent directories if they don't exist.
    /// If a config file already exists, it updates only the `[github]`
    /// section, preserving formatting, comments, and other settings.
    pub fn save_github_token(token: &str) -> io::Result<PathBuf> {
        use toml_edit::{DocumentMut, value};

        let config_path = Self::default_config_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = if config_path.exists() {
            fs::read_to_string(&config_path)?
        } else {
            String::new()
        };

        // toml_edit preserves formatting and comments in the rest of
        // the document.
        let mut doc: DocumentMut = content.parse().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Invalid TOML: {}", e))
        })?;

        if !doc.contains_key("github") {
            doc["github"] = toml_edit::table();
        }
        doc["github"]["token"] = value(token);

        fs::write(&config_path, doc.to_string())?;
        Ok(config_path)
    }
}
