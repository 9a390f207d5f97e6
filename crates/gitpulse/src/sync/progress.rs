//! Progress event stream for sync runs.
//!
//! Events flow over an unbounded channel from the engine task to whoever
//! holds the receiver. Sends are fire-and-forget: a dropped receiver
//! never stalls or fails the run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::error::SyncErrorKind;

/// Progress events emitted during a sync run, in order:
/// one `Start`, then per repository a `RepoStart`, zero or more
/// `Progress`, and a `RepoDone`, ending with exactly one terminal
/// `Complete` or `Error`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SyncEvent {
    /// The run passed preflight and is starting.
    Start {
        run_id: Uuid,
        total_repos: usize,
        /// Remaining API budget at preflight.
        budget_remaining: usize,
        /// Total API budget in the current window.
        budget_limit: usize,
    },

    /// Starting one repository.
    RepoStart {
        /// 1-indexed position within the run.
        index: usize,
        total: usize,
        full_name: String,
    },

    /// Periodic progress within one repository.
    Progress { full_name: String, message: String },

    /// One repository finished, with its ingested item counts.
    RepoDone {
        full_name: String,
        commits: i64,
        pulls: i64,
        reviews: i64,
    },

    /// Terminal: every target repository completed.
    Complete {
        run_id: Uuid,
        total_repos: usize,
        commits: i64,
        pulls: i64,
        reviews: i64,
    },

    /// Terminal: the run stopped early. `completed_repos` tells partial
    /// from total failure; cancellation arrives here with
    /// `kind = cancelled`.
    Error {
        run_id: Uuid,
        #[serde(rename = "error_kind")]
        kind: SyncErrorKind,
        message: String,
        completed_repos: usize,
        /// Budget reset time, for rate-limit errors.
        #[serde(skip_serializing_if = "Option::is_none")]
        reset_at: Option<DateTime<Utc>>,
    },
}

/// Sending half of the progress stream.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<SyncEvent>,
}

impl ProgressSender {
    /// Create a connected sender/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit an event. A closed channel is ignored.
    pub fn emit(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_emit_order() {
        let (tx, mut rx) = ProgressSender::channel();
        let run_id = Uuid::new_v4();

        tx.emit(SyncEvent::Start {
            run_id,
            total_repos: 1,
            budget_remaining: 4000,
            budget_limit: 5000,
        });
        tx.emit(SyncEvent::RepoStart {
            index: 1,
            total: 1,
            full_name: "acme/widgets".to_string(),
        });

        assert!(matches!(rx.try_recv().unwrap(), SyncEvent::Start { .. }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            SyncEvent::RepoStart { index: 1, .. }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = ProgressSender::channel();
        drop(rx);
        tx.emit(SyncEvent::Progress {
            full_name: "acme/widgets".to_string(),
            message: "20 commits".to_string(),
        });
    }

    #[test]
    fn test_event_serializes_with_kind_tag() {
        let event = SyncEvent::RepoDone {
            full_name: "acme/widgets".to_string(),
            commits: 3,
            pulls: 1,
            reviews: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "repo_done");
        assert_eq!(json["commits"], 3);
    }
}
