//! sea-orm entities for the gitpulse schema.

pub mod commit;
pub mod pr_state;
pub mod prelude;
pub mod pull_request;
pub mod repo_sync_state;
pub mod repository;
pub mod review;
pub mod sync_run;
pub mod sync_status;
