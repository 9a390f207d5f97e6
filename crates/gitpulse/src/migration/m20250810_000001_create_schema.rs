//! Initial migration to create the gitpulse database schema.
//!
//! Referential integrity between repositories and their commits, pull
//! requests, and reviews is caller-enforced (the store cascades deletes
//! explicitly), so no foreign-key constraints are declared here.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_repositories(manager).await?;
        self.create_commits(manager).await?;
        self.create_pull_requests(manager).await?;
        self.create_reviews(manager).await?;
        self.create_repo_sync_state(manager).await?;
        self.create_sync_runs(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncRuns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RepoSyncState::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PullRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Commits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Repositories::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_repositories(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repositories::Table)
                    .if_not_exists()
                    // GitHub's numeric repository id.
                    .col(
                        ColumnDef::new(Repositories::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Repositories::Owner).string().not_null())
                    .col(ColumnDef::new(Repositories::Name).string().not_null())
                    .col(
                        ColumnDef::new(Repositories::AddedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repositories_owner_name")
                    .table(Repositories::Table)
                    .col(Repositories::Owner)
                    .col(Repositories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_commits(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Commits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Commits::Sha).string().not_null().primary_key())
                    .col(ColumnDef::new(Commits::RepoId).big_integer().not_null())
                    .col(ColumnDef::new(Commits::AuthorLogin).string().null())
                    .col(ColumnDef::new(Commits::AuthorEmail).string().null())
                    .col(ColumnDef::new(Commits::Message).text().not_null())
                    .col(
                        ColumnDef::new(Commits::Additions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Commits::Deletions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Commits::CommittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_commits_repo")
                    .table(Commits::Table)
                    .col(Commits::RepoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_commits_repo_committed_at")
                    .table(Commits::Table)
                    .col(Commits::RepoId)
                    .col(Commits::CommittedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_pull_requests(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PullRequests::Table)
                    .if_not_exists()
                    // GitHub's numeric pull request id (global, not per-repo).
                    .col(
                        ColumnDef::new(PullRequests::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PullRequests::RepoId).big_integer().not_null())
                    .col(ColumnDef::new(PullRequests::Number).big_integer().not_null())
                    .col(ColumnDef::new(PullRequests::AuthorLogin).string().null())
                    .col(ColumnDef::new(PullRequests::Title).text().not_null())
                    .col(ColumnDef::new(PullRequests::State).string().not_null())
                    .col(
                        ColumnDef::new(PullRequests::Additions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PullRequests::Deletions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PullRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PullRequests::MergedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PullRequests::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pull_requests_repo")
                    .table(PullRequests::Table)
                    .col(PullRequests::RepoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pull_requests_repo_number")
                    .table(PullRequests::Table)
                    .col(PullRequests::RepoId)
                    .col(PullRequests::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_reviews(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Reviews::PullRequestId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reviews::ReviewerLogin).string().not_null())
                    .col(ColumnDef::new(Reviews::State).string().not_null())
                    .col(
                        ColumnDef::new(Reviews::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_pull_request")
                    .table(Reviews::Table)
                    .col(Reviews::PullRequestId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_repo_sync_state(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RepoSyncState::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RepoSyncState::RepoId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RepoSyncState::LastCommitSync)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RepoSyncState::LastPrSync)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_sync_runs(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncRuns::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SyncRuns::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(SyncRuns::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::FinishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(SyncRuns::Status).string().not_null())
                    .col(
                        ColumnDef::new(SyncRuns::TotalRepos)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::CompletedRepos)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::CommitsSynced)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::PrsSynced)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::ReviewsSynced)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SyncRuns::ErrorMessage).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_runs_started_at")
                    .table(SyncRuns::Table)
                    .col(SyncRuns::StartedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "repositories")]
enum Repositories {
    Table,
    Id,
    Owner,
    Name,
    AddedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "commits")]
enum Commits {
    Table,
    Sha,
    RepoId,
    AuthorLogin,
    AuthorEmail,
    Message,
    Additions,
    Deletions,
    CommittedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "pull_requests")]
enum PullRequests {
    Table,
    Id,
    RepoId,
    Number,
    AuthorLogin,
    Title,
    State,
    Additions,
    Deletions,
    CreatedAt,
    MergedAt,
    ClosedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "reviews")]
enum Reviews {
    Table,
    Id,
    PullRequestId,
    ReviewerLogin,
    State,
    SubmittedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "repo_sync_state")]
enum RepoSyncState {
    Table,
    RepoId,
    LastCommitSync,
    LastPrSync,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "sync_runs")]
enum SyncRuns {
    Table,
    Id,
    StartedAt,
    FinishedAt,
    Status,
    TotalRepos,
    CompletedRepos,
    CommitsSynced,
    PrsSynced,
    ReviewsSynced,
    ErrorMessage,
}
