//! Progress reporting for sync runs.
//!
//! Two modes, selected by TTY detection:
//! - Interactive mode: animated per-repository bars using indicatif
//! - Logging mode: structured logging using tracing

use std::sync::Mutex;

use console::Term;
use gitpulse::sync::SyncEvent;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress reporter that handles both interactive and logging modes.
pub(crate) enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter)
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: &SyncEvent) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }
}

/// Interactive progress reporter using indicatif.
///
/// One spinner per repository, created on `RepoStart` and finished on
/// `RepoDone`; terminal events print a summary line.
pub(crate) struct InteractiveReporter {
    multi: MultiProgress,
    current: Mutex<Option<ProgressBar>>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            current: Mutex::new(None),
        }
    }

    pub fn handle(&self, event: &SyncEvent) {
        match event {
            SyncEvent::Start {
                total_repos,
                budget_remaining,
                budget_limit,
                ..
            } => {
                self.multi
                    .println(format!(
                        "Syncing {} repositories ({}/{} API budget remaining)",
                        total_repos, budget_remaining, budget_limit
                    ))
                    .ok();
            }

            SyncEvent::RepoStart {
                index,
                total,
                full_name,
            } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(std::time::Duration::from_millis(100));
                pb.set_prefix(format!("[{}/{}]", index, total));
                pb.set_message(format!("{} syncing...", full_name));
                *self.current.lock().unwrap() = Some(pb);
            }

            SyncEvent::Progress { full_name, message } => {
                if let Some(pb) = self.current.lock().unwrap().as_ref() {
                    pb.set_message(format!("{} {}", full_name, message));
                }
            }

            SyncEvent::RepoDone {
                full_name,
                commits,
                pulls,
                reviews,
            } => {
                if let Some(pb) = self.current.lock().unwrap().take() {
                    pb.finish_with_message(format!(
                        "✓ {} ({} commits, {} PRs, {} reviews)",
                        full_name, commits, pulls, reviews
                    ));
                }
            }

            SyncEvent::Complete {
                total_repos,
                commits,
                pulls,
                reviews,
                ..
            } => {
                self.multi
                    .println(format!(
                        "✓ Sync complete: {} repos, {} commits, {} PRs, {} reviews",
                        total_repos, commits, pulls, reviews
                    ))
                    .ok();
            }

            SyncEvent::Error {
                message,
                completed_repos,
                reset_at,
                ..
            } => {
                if let Some(pb) = self.current.lock().unwrap().take() {
                    pb.abandon();
                }
                self.multi
                    .println(format!(
                        "✗ Sync stopped after {} repos: {}",
                        completed_repos, message
                    ))
                    .ok();
                if let Some(reset) = reset_at {
                    self.multi
                        .println(format!(
                            "  Budget resets at {}",
                            reset.format("%Y-%m-%d %H:%M:%S UTC")
                        ))
                        .ok();
                }
            }

            _ => {}
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .expect("Invalid template")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }
}

/// Logging reporter using tracing for structured output.
pub(crate) struct LoggingReporter;

impl LoggingReporter {
    pub fn handle(&self, event: &SyncEvent) {
        match event {
            SyncEvent::Start {
                run_id,
                total_repos,
                budget_remaining,
                budget_limit,
            } => {
                tracing::info!(
                    %run_id,
                    total_repos,
                    budget_remaining,
                    budget_limit,
                    "Sync started"
                );
            }

            SyncEvent::RepoStart {
                index,
                total,
                full_name,
            } => {
                tracing::info!(index, total, repo = %full_name, "Syncing repository");
            }

            SyncEvent::Progress { full_name, message } => {
                tracing::debug!(repo = %full_name, progress = %message, "Progress");
            }

            SyncEvent::RepoDone {
                full_name,
                commits,
                pulls,
                reviews,
            } => {
                tracing::info!(repo = %full_name, commits, pulls, reviews, "Repository synced");
            }

            SyncEvent::Complete {
                run_id,
                total_repos,
                commits,
                pulls,
                reviews,
            } => {
                tracing::info!(%run_id, total_repos, commits, pulls, reviews, "Sync complete");
            }

            SyncEvent::Error {
                run_id,
                message,
                completed_repos,
                ..
            } => {
                tracing::error!(%run_id, completed_repos, error = %message, "Sync stopped");
            }

            _ => {}
        }
    }
}
