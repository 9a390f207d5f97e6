//! Re-exports of entity types under conventional aliases.

pub use super::commit::{
    ActiveModel as CommitActiveModel, Column as CommitColumn, Entity as Commit,
    Model as CommitModel,
};
pub use super::pr_state::PrState;
pub use super::pull_request::{
    ActiveModel as PullRequestActiveModel, Column as PullRequestColumn, Entity as PullRequest,
    Model as PullRequestModel,
};
pub use super::repo_sync_state::{
    ActiveModel as RepoSyncStateActiveModel, Column as RepoSyncStateColumn,
    Entity as RepoSyncState, Model as RepoSyncStateModel,
};
pub use super::repository::{
    ActiveModel as RepositoryActiveModel, Column as RepositoryColumn, Entity as Repository,
    Model as RepositoryModel,
};
pub use super::review::{
    ActiveModel as ReviewActiveModel, Column as ReviewColumn, Entity as Review,
    Model as ReviewModel,
};
pub use super::sync_run::{
    ActiveModel as SyncRunActiveModel, Column as SyncRunColumn, Entity as SyncRun,
    Model as SyncRunModel,
};
pub use super::sync_status::SyncStatus;
