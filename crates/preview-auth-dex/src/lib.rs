//! Dex client registry for preview-auth
//!
//! Implements [`preview_auth_core::ClientRegistry`] against the Dex gRPC API
//! (`api.Dex` service: `ListClients`, `CreateClient`, `DeleteClient`).
//! Generated stubs are checked in under `src/generated`.

pub mod error;
pub mod pb;
pub mod registry;

pub use error::DexError;
pub use registry::{DexConfig, DexRegistry};

/// Result type for Dex setup operations
pub type Result<T> = std::result::Result<T, DexError>;
