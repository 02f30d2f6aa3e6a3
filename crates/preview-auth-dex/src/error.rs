//! Error types for the Dex registry

use preview_auth_core::RegistryError;
use thiserror::Error;

/// Errors that can occur while setting up or using the Dex channel
#[derive(Error, Debug)]
pub enum DexError {
    /// Host could not be turned into a gRPC endpoint
    #[error("invalid Dex endpoint: {0}")]
    InvalidEndpoint(String),

    /// Channel or TLS setup failed
    #[error("Dex transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The server answered with a non-OK status
    #[error("Dex call failed: {0}")]
    Status(#[from] tonic::Status),

    /// CA certificate could not be read
    #[error("failed to read CA certificate {path}: {source}")]
    Certificate {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<DexError> for RegistryError {
    fn from(err: DexError) -> Self {
        match err {
            DexError::Status(status) => {
                RegistryError::Transport(format!("{:?}: {}", status.code(), status.message()))
            }
            DexError::Transport(e) => RegistryError::Transport(e.to_string()),
            DexError::InvalidEndpoint(_) | DexError::Certificate { .. } => {
                RegistryError::Config(err.to_string())
            }
        }
    }
}
