//! Error types for the reconciliation core

use thiserror::Error;

/// Errors raised by a merge-request source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source could not be reached (connection, TLS, timeout)
    #[error("merge request source unreachable: {0}")]
    Transport(String),

    /// The source answered with a non-success status
    #[error("merge request API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("failed to decode merge request listing: {0}")]
    Decode(String),

    /// Client-side setup failed (bad URL, unreadable certificate)
    #[error("merge request source misconfigured: {0}")]
    Config(String),
}

/// Errors raised by a client registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The RPC itself failed (channel down, TLS, status code from the server)
    #[error("client registry transport error: {0}")]
    Transport(String),

    /// Create rejected because the id is taken
    #[error("client already exists: {0}")]
    AlreadyExists(String),

    /// Delete rejected because the id is unknown
    #[error("client not found: {0}")]
    NotFound(String),

    /// The registry replied with something we cannot use
    #[error("invalid registry response: {0}")]
    InvalidResponse(String),

    /// Client-side setup failed (bad endpoint, unreadable certificate)
    #[error("client registry misconfigured: {0}")]
    Config(String),
}

impl RegistryError {
    /// True for failures of the channel rather than business rejections.
    pub fn is_transport(&self) -> bool {
        matches!(self, RegistryError::Transport(_))
    }
}

/// Result type for merge-request source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type for client registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
