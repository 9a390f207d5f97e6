//! GitHub REST API adapter.
//!
//! This module implements [`crate::api::ActivityApi`] on top of octocrab.
//! It is a thin wire layer: raw response shapes live in [`types`],
//! conversion into normalized records in [`convert`], and error mapping
//! in [`error`]. No sync logic lives here.

pub mod client;
pub mod convert;
pub mod error;
pub mod types;

pub use client::GitHubClient;
pub use error::GitHubError;
