//! Error types for the GitLab lister

use preview_auth_core::SourceError;
use thiserror::Error;

/// Errors that can occur while talking to GitLab
#[derive(Error, Debug)]
pub enum GitLabError {
    /// GitLab answered with a non-success status
    #[error("GitLab API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Request could not be sent or the response could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL cannot carry an API path
    #[error("invalid GitLab URL: {0}")]
    InvalidUrl(String),

    /// CA certificate could not be read
    #[error("failed to read CA certificate {path}: {source}")]
    Certificate {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<GitLabError> for SourceError {
    fn from(err: GitLabError) -> Self {
        match err {
            GitLabError::Api { status, message } => SourceError::Api { status, message },
            GitLabError::Http(e) if e.is_decode() => SourceError::Decode(e.to_string()),
            GitLabError::Http(e) if e.is_builder() => SourceError::Config(e.to_string()),
            GitLabError::Http(e) => SourceError::Transport(e.to_string()),
            GitLabError::InvalidUrl(_) | GitLabError::Certificate { .. } => {
                SourceError::Config(err.to_string())
            }
        }
    }
}
