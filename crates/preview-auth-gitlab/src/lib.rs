//! GitLab merge request source for preview-auth
//!
//! Implements [`preview_auth_core::MergeRequestSource`] on top of the GitLab
//! REST API v4. Pagination is handled internally so callers always get the
//! complete list of open merge requests in one call.

pub mod client;
pub mod error;

pub use client::{GitLabClient, GitLabConfig, DEFAULT_PER_PAGE};
pub use error::GitLabError;

/// Result type for GitLab operations
pub type Result<T> = std::result::Result<T, GitLabError>;
