//! End-to-end sync engine tests against a scripted in-memory remote.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use gitpulse::api::{
    ActivityApi, ApiError, CommitDetail, CommitSummary, PullDetail, PullSummary, RateLimitInfo,
    RemoteRepo, ReviewRecord,
};
use gitpulse::connect_and_migrate;
use gitpulse::entity::prelude::*;
use gitpulse::store::{commits, pull_requests, repos, reviews, sync_runs, sync_state};
use gitpulse::sync::{SyncEngine, SyncError, SyncErrorKind, SyncEvent, SyncOptions, SyncTargets};

#[derive(Default)]
struct CallLog {
    rate_limit: usize,
    commit_pages: Vec<(String, u32)>,
    pull_pages: Vec<(String, u32)>,
    commit_details: usize,
}

struct RepoData {
    remote: RemoteRepo,
    /// Newest first, matching the remote's ordering.
    commits: Vec<CommitSummary>,
    /// Sorted by update time descending, matching the remote's ordering.
    pulls: Vec<PullSummary>,
    /// Reviews keyed by PR number.
    reviews: HashMap<i64, Vec<ReviewRecord>>,
}

struct FakeApi {
    repos: HashMap<String, RepoData>,
    budget: Mutex<VecDeque<usize>>,
    default_remaining: usize,
    fail_commit_shas: HashSet<String>,
    fail_pull_numbers: HashSet<i64>,
    /// When set, `get_rate_limit` waits for a permit before answering.
    gate: Option<Arc<Semaphore>>,
    /// When set, `list_commits` for the named repo waits for a permit.
    block_list_commits: Option<(String, Arc<Semaphore>)>,
    calls: Arc<Mutex<CallLog>>,
}

impl FakeApi {
    fn new(data: Vec<RepoData>) -> Self {
        let repos = data
            .into_iter()
            .map(|d| (format!("{}/{}", d.remote.owner, d.remote.name), d))
            .collect();
        Self {
            repos,
            budget: Mutex::new(VecDeque::new()),
            default_remaining: 4000,
            fail_commit_shas: HashSet::new(),
            fail_pull_numbers: HashSet::new(),
            gate: None,
            block_list_commits: None,
            calls: Arc::new(Mutex::new(CallLog::default())),
        }
    }

    fn repo(&self, owner: &str, name: &str) -> Result<&RepoData, ApiError> {
        self.repos
            .get(&format!("{owner}/{name}"))
            .ok_or_else(|| ApiError::NotFound(format!("{owner}/{name}")))
    }
}

fn page_of<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
    items
        .iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl ActivityApi for FakeApi {
    async fn get_rate_limit(&self) -> Result<RateLimitInfo, ApiError> {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.map_err(|_| {
                ApiError::Transport("gate closed".to_string())
            })?;
        }
        self.calls.lock().unwrap().rate_limit += 1;
        let remaining = self
            .budget
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_remaining);
        Ok(RateLimitInfo {
            limit: 5000,
            remaining,
            reset_at: Utc::now() + ChronoDuration::hours(1),
        })
    }

    async fn get_repo(&self, owner: &str, name: &str) -> Result<RemoteRepo, ApiError> {
        Ok(self.repo(owner, name)?.remote.clone())
    }

    async fn list_commits(
        &self,
        owner: &str,
        name: &str,
        since: Option<DateTime<Utc>>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CommitSummary>, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .commit_pages
            .push((format!("{owner}/{name}"), page));
        if let Some((blocked, gate)) = &self.block_list_commits {
            if blocked == &format!("{owner}/{name}") {
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|_| ApiError::Transport("gate closed".to_string()))?;
            }
        }
        let data = self.repo(owner, name)?;
        let window: Vec<CommitSummary> = data
            .commits
            .iter()
            .filter(|c| since.map_or(true, |s| c.committed_at > s))
            .cloned()
            .collect();
        Ok(page_of(&window, page, per_page))
    }

    async fn get_commit(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<CommitDetail, ApiError> {
        self.calls.lock().unwrap().commit_details += 1;
        self.repo(owner, name)?;
        if self.fail_commit_shas.contains(sha) {
            return Err(ApiError::Transport(format!("injected failure on {sha}")));
        }
        Ok(CommitDetail {
            additions: 3,
            deletions: 1,
        })
    }

    async fn list_pulls(
        &self,
        owner: &str,
        name: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullSummary>, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .pull_pages
            .push((format!("{owner}/{name}"), page));
        let data = self.repo(owner, name)?;
        Ok(page_of(&data.pulls, page, per_page))
    }

    async fn get_pull(&self, owner: &str, name: &str, number: i64) -> Result<PullDetail, ApiError> {
        self.repo(owner, name)?;
        if self.fail_pull_numbers.contains(&number) {
            return Err(ApiError::Transport(format!("injected failure on #{number}")));
        }
        Ok(PullDetail {
            additions: 10,
            deletions: 2,
        })
    }

    async fn list_reviews(
        &self,
        owner: &str,
        name: &str,
        number: i64,
    ) -> Result<Vec<ReviewRecord>, ApiError> {
        let data = self.repo(owner, name)?;
        Ok(data.reviews.get(&number).cloned().unwrap_or_default())
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn commit(i: usize) -> CommitSummary {
    CommitSummary {
        sha: format!("sha{i:04}"),
        author_login: Some("dev".to_string()),
        author_email: Some("dev@example.com".to_string()),
        message: format!("change {i}"),
        committed_at: base_time() - ChronoDuration::minutes(i as i64),
    }
}

fn pull(number: i64, minutes_old: i64, merged: bool) -> PullSummary {
    let updated = base_time() - ChronoDuration::minutes(minutes_old);
    PullSummary {
        id: 1000 + number,
        number,
        author_login: Some("dev".to_string()),
        title: format!("pr {number}"),
        state: if merged { PrState::Closed } else { PrState::Open },
        created_at: updated - ChronoDuration::hours(1),
        updated_at: updated,
        merged_at: merged.then_some(updated),
        closed_at: merged.then_some(updated),
    }
}

fn review(id: i64, state: &str) -> ReviewRecord {
    ReviewRecord {
        id,
        reviewer_login: "reviewer".to_string(),
        state: state.to_string(),
        submitted_at: base_time(),
    }
}

fn widgets_repo() -> RepoData {
    let mut reviews_by_pr = HashMap::new();
    reviews_by_pr.insert(1, vec![review(1, "APPROVED"), review(2, "COMMENTED")]);
    reviews_by_pr.insert(2, vec![review(3, "CHANGES_REQUESTED")]);

    RepoData {
        remote: RemoteRepo {
            id: 1,
            owner: "acme".to_string(),
            name: "widgets".to_string(),
        },
        commits: (0..180).map(commit).collect(),
        pulls: vec![
            pull(5, 0, false),
            pull(4, 10, true),
            pull(3, 20, false),
            pull(2, 30, true),
            pull(1, 40, false),
        ],
        reviews: reviews_by_pr,
    }
}

fn fast_options() -> SyncOptions {
    SyncOptions {
        request_spacing: Duration::from_millis(1),
        ..Default::default()
    }
}

/// `DatabaseConnection` is not `Clone` while sea-orm's `mock` feature is
/// enabled (it is, via this crate's dev-dependencies), so hand the engine
/// a second handle to the same in-memory pool instead.
fn clone_db(db: &DatabaseConnection) -> DatabaseConnection {
    db.get_sqlite_connection_pool().clone().into()
}

async fn setup_db(api: &FakeApi) -> DatabaseConnection {
    let db = connect_and_migrate("sqlite::memory:").await.unwrap();
    for data in api.repos.values() {
        repos::insert(&db, &data.remote).await.unwrap();
    }
    db
}

async fn drain(mut rx: tokio::sync::mpsc::UnboundedReceiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_full_sync_ingests_all_resources() {
    let api = FakeApi::new(vec![widgets_repo()]);
    let calls = Arc::clone(&api.calls);
    let db = setup_db(&api).await;
    let engine = SyncEngine::new(api, clone_db(&db), fast_options());

    let (run_id, rx) = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await
        .unwrap();
    let events = drain(rx).await;

    assert!(matches!(
        events.first(),
        Some(SyncEvent::Start { total_repos: 1, .. })
    ));
    assert!(matches!(
        events.get(1),
        Some(SyncEvent::RepoStart { index: 1, .. })
    ));
    let progress = events
        .iter()
        .filter(|e| matches!(e, SyncEvent::Progress { .. }))
        .count();
    assert_eq!(progress, 9, "one progress event per 20 commits");
    assert!(matches!(
        events[events.len() - 2],
        SyncEvent::RepoDone {
            commits: 180,
            pulls: 5,
            reviews: 3,
            ..
        }
    ));
    assert!(matches!(
        events.last(),
        Some(SyncEvent::Complete {
            commits: 180,
            pulls: 5,
            reviews: 3,
            ..
        })
    ));

    assert_eq!(commits::count_for_repo(&db, 1).await.unwrap(), 180);
    assert_eq!(pull_requests::count_for_repo(&db, 1).await.unwrap(), 5);
    assert_eq!(pull_requests::count_merged_for_repo(&db, 1).await.unwrap(), 2);
    assert_eq!(reviews::count_for_repo(&db, 1).await.unwrap(), 3);

    let run = sync_runs::find_by_id(&db, run_id).await.unwrap().unwrap();
    assert_eq!(run.status, SyncStatus::Complete);
    assert_eq!(run.completed_repos, 1);
    assert_eq!(run.commits_synced, 180);
    assert!(run.finished_at.is_some());

    let state = sync_state::get(&db, 1).await.unwrap().unwrap();
    assert!(state.last_commit_sync.is_some());
    assert!(state.last_pr_sync.is_some());

    let log = calls.lock().unwrap();
    let pages: Vec<u32> = log.commit_pages.iter().map(|(_, p)| *p).collect();
    assert_eq!(pages, vec![1, 2], "180 commits span two pages of 100");
    assert_eq!(log.commit_details, 180);
}

#[tokio::test]
async fn test_incremental_rerun_skips_known_history() {
    let api = FakeApi::new(vec![widgets_repo()]);
    let calls = Arc::clone(&api.calls);
    let db = setup_db(&api).await;
    let engine = SyncEngine::new(api, clone_db(&db), fast_options());

    let (_, rx) = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await
        .unwrap();
    drain(rx).await;

    let details_after_first = calls.lock().unwrap().commit_details;

    let (_, rx) = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await
        .unwrap();
    let events = drain(rx).await;

    assert!(matches!(
        events.iter().find(|e| matches!(e, SyncEvent::RepoDone { .. })),
        Some(SyncEvent::RepoDone {
            commits: 0,
            pulls: 0,
            ..
        })
    ));
    assert_eq!(
        calls.lock().unwrap().commit_details,
        details_after_first,
        "no detail calls on an unchanged repository"
    );
    assert_eq!(commits::count_for_repo(&db, 1).await.unwrap(), 180);
}

#[tokio::test]
async fn test_pull_short_circuit_stops_paging() {
    let mut data = widgets_repo();
    data.commits = Vec::new();
    // 120 PRs updated descending; the newest 60 postdate the watermark.
    data.pulls = (0..120).map(|i| pull(120 - i, i, false)).collect();
    data.reviews = HashMap::new();
    let watermark = base_time() - ChronoDuration::minutes(59) - ChronoDuration::seconds(30);

    let api = FakeApi::new(vec![data]);
    let calls = Arc::clone(&api.calls);
    let db = setup_db(&api).await;
    sync_state::set_pr_watermark(&db, 1, watermark).await.unwrap();

    let engine = SyncEngine::new(api, clone_db(&db), fast_options());
    let (_, rx) = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await
        .unwrap();
    let events = drain(rx).await;

    assert!(matches!(
        events.iter().find(|e| matches!(e, SyncEvent::RepoDone { .. })),
        Some(SyncEvent::RepoDone { pulls: 60, .. })
    ));

    let pages: Vec<u32> = calls.lock().unwrap().pull_pages.iter().map(|(_, p)| *p).collect();
    assert_eq!(
        pages,
        vec![1, 2],
        "first stale item is on page 2; page 3 must never be requested"
    );
    assert_eq!(pull_requests::count_for_repo(&db, 1).await.unwrap(), 60);
}

#[tokio::test]
async fn test_pull_exactly_at_watermark_is_kept() {
    let mut data = widgets_repo();
    data.commits = Vec::new();
    data.pulls = vec![pull(3, 0, false), pull(2, 30, false), pull(1, 60, false)];
    data.reviews = HashMap::new();
    // Watermark coincides with PR #2's update time. Only PR #1, strictly
    // older, is skipped.
    let watermark = base_time() - ChronoDuration::minutes(30);

    let api = FakeApi::new(vec![data]);
    let db = setup_db(&api).await;
    sync_state::set_pr_watermark(&db, 1, watermark).await.unwrap();

    let engine = SyncEngine::new(api, clone_db(&db), fast_options());
    let (_, rx) = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await
        .unwrap();
    let events = drain(rx).await;

    assert!(matches!(
        events.iter().find(|e| matches!(e, SyncEvent::RepoDone { .. })),
        Some(SyncEvent::RepoDone { pulls: 2, .. })
    ));
    assert_eq!(pull_requests::count_for_repo(&db, 1).await.unwrap(), 2);
}

#[tokio::test]
async fn test_preflight_gate_blocks_run() {
    let mut api = FakeApi::new(vec![widgets_repo()]);
    api.default_remaining = 10;
    let calls = Arc::clone(&api.calls);
    let db = setup_db(&api).await;
    let engine = SyncEngine::new(api, clone_db(&db), fast_options());

    let (run_id, rx) = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await
        .unwrap();
    let events = drain(rx).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        SyncEvent::Error {
            kind: SyncErrorKind::RateLimited,
            completed_repos: 0,
            reset_at: Some(_),
            ..
        }
    ));

    let run = sync_runs::find_by_id(&db, run_id).await.unwrap().unwrap();
    assert_eq!(run.status, SyncStatus::Error);

    let log = calls.lock().unwrap();
    assert!(log.commit_pages.is_empty(), "nothing fetched past the gate");
    assert_eq!(commits::count_for_repo(&db, 1).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failure_mid_repo_classifies_partial_and_error() {
    // First repo clean, second repo fails during its commit phase.
    let clean = widgets_repo();
    let broken = RepoData {
        remote: RemoteRepo {
            id: 2,
            owner: "acme".to_string(),
            name: "gadgets".to_string(),
        },
        commits: vec![CommitSummary {
            sha: "deadbeef".to_string(),
            author_login: None,
            author_email: None,
            message: "x".to_string(),
            committed_at: base_time(),
        }],
        pulls: Vec::new(),
        reviews: HashMap::new(),
    };
    let mut api = FakeApi::new(vec![clean, broken]);
    api.fail_commit_shas.insert("deadbeef".to_string());
    let db = setup_db(&api).await;
    let engine = SyncEngine::new(api, clone_db(&db), fast_options());

    let (run_id, rx) = engine
        .start(SyncTargets::Ids(vec![1, 2]), CancellationToken::new())
        .await
        .unwrap();
    let events = drain(rx).await;

    assert!(matches!(
        events.last(),
        Some(SyncEvent::Error {
            kind: SyncErrorKind::Api,
            completed_repos: 1,
            ..
        })
    ));

    let run = sync_runs::find_by_id(&db, run_id).await.unwrap().unwrap();
    assert_eq!(run.status, SyncStatus::Partial);
    assert_eq!(run.completed_repos, 1);
    assert!(run.error_message.is_some());

    // The clean repo's data and watermarks survive; the broken repo
    // never advanced its watermark.
    assert_eq!(commits::count_for_repo(&db, 1).await.unwrap(), 180);
    assert!(sync_state::get(&db, 1).await.unwrap().is_some());
    assert!(sync_state::get(&db, 2).await.unwrap().is_none());

    // Same failure with the broken repo first classifies as error.
    let (run_id, rx) = engine
        .start(SyncTargets::Ids(vec![2]), CancellationToken::new())
        .await
        .unwrap();
    let events = drain(rx).await;
    assert!(matches!(
        events.last(),
        Some(SyncEvent::Error {
            completed_repos: 0,
            ..
        })
    ));
    let run = sync_runs::find_by_id(&db, run_id).await.unwrap().unwrap();
    assert_eq!(run.status, SyncStatus::Error);
}

#[tokio::test]
async fn test_pr_failure_preserves_commit_watermark() {
    let mut api = FakeApi::new(vec![widgets_repo()]);
    api.fail_pull_numbers.insert(5);
    let db = setup_db(&api).await;
    let engine = SyncEngine::new(api, clone_db(&db), fast_options());

    let (run_id, rx) = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await
        .unwrap();
    drain(rx).await;

    let run = sync_runs::find_by_id(&db, run_id).await.unwrap().unwrap();
    assert_eq!(run.status, SyncStatus::Error);

    // Commits landed and their watermark advanced before the PR phase
    // failed; the PR watermark must not have moved.
    assert_eq!(commits::count_for_repo(&db, 1).await.unwrap(), 180);
    let state = sync_state::get(&db, 1).await.unwrap().unwrap();
    assert!(state.last_commit_sync.is_some());
    assert!(state.last_pr_sync.is_none());
}

#[tokio::test]
async fn test_cancellation_mid_run() {
    let mut second = widgets_repo();
    second.remote = RemoteRepo {
        id: 2,
        owner: "acme".to_string(),
        name: "gadgets".to_string(),
    };
    let block = Arc::new(Semaphore::new(0));
    let mut api = FakeApi::new(vec![widgets_repo(), second]);
    api.block_list_commits = Some(("acme/gadgets".to_string(), Arc::clone(&block)));
    let db = setup_db(&api).await;
    let engine = SyncEngine::new(api, clone_db(&db), fast_options());

    let cancel = CancellationToken::new();
    let (run_id, mut rx) = engine
        .start(SyncTargets::Ids(vec![1, 2]), cancel.clone())
        .await
        .unwrap();

    // The second repo's first page fetch is held at the gate, so the
    // cancel lands while the run is provably still in flight.
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        if matches!(&event, SyncEvent::RepoStart { full_name, .. } if full_name == "acme/gadgets") {
            cancel.cancel();
            block.add_permits(10);
        }
        events.push(event);
    }

    assert!(matches!(
        events.last(),
        Some(SyncEvent::Error {
            kind: SyncErrorKind::Cancelled,
            completed_repos: 1,
            ..
        })
    ));
    let run = sync_runs::find_by_id(&db, run_id).await.unwrap().unwrap();
    assert_eq!(run.status, SyncStatus::Cancelled);
    assert_eq!(run.completed_repos, 1);
}

#[tokio::test]
async fn test_second_start_rejected_while_running() {
    let gate = Arc::new(Semaphore::new(0));
    let mut api = FakeApi::new(vec![widgets_repo()]);
    api.gate = Some(Arc::clone(&gate));
    let db = setup_db(&api).await;
    let engine = SyncEngine::new(api, clone_db(&db), fast_options());

    // First run blocks inside preflight until the gate opens.
    let (run_id, rx) = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await
        .unwrap();

    let second = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await;
    assert!(matches!(second, Err(SyncError::AlreadyRunning)));

    gate.add_permits(10_000);
    drain(rx).await;

    let run = sync_runs::find_by_id(&db, run_id).await.unwrap().unwrap();
    assert_eq!(run.status, SyncStatus::Complete);

    // The lock is released once the run finishes.
    let third = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await;
    assert!(third.is_ok());
    let (_, rx) = third.unwrap();
    drain(rx).await;
}

#[tokio::test]
async fn test_target_validation_fails_fast() {
    let api = FakeApi::new(vec![]);
    let db = connect_and_migrate("sqlite::memory:").await.unwrap();
    let engine = SyncEngine::new(api, clone_db(&db), fast_options());

    let result = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await;
    assert!(matches!(result, Err(SyncError::EmptyTargetSet)));

    let result = engine
        .start(
            SyncTargets::FullName("acme/unknown".to_string()),
            CancellationToken::new(),
        )
        .await;
    assert!(matches!(result, Err(SyncError::NotTracked(_))));

    let result = engine
        .start(SyncTargets::Ids(vec![42]), CancellationToken::new())
        .await;
    assert!(matches!(result, Err(SyncError::NotTracked(_))));

    // No run rows were written for any rejected start.
    assert!(sync_runs::recent(&db, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_survives_dropped_receiver() {
    let api = FakeApi::new(vec![widgets_repo()]);
    let db = setup_db(&api).await;
    let engine = SyncEngine::new(api, clone_db(&db), fast_options());

    let (run_id, rx) = engine
        .start(SyncTargets::All, CancellationToken::new())
        .await
        .unwrap();
    drop(rx);

    let mut status = SyncStatus::Running;
    for _ in 0..500 {
        if let Some(run) = sync_runs::find_by_id(&db, run_id).await.unwrap() {
            status = run.status;
            if status.is_terminal() {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(status, SyncStatus::Complete);
    assert_eq!(commits::count_for_repo(&db, 1).await.unwrap(), 180);
}
