//! Collaborator traits
//!
//! - `MergeRequestSource`: lists the currently open merge requests
//! - `ClientRegistry`: list/create/delete OIDC clients
//!
//! Both are async and backend-agnostic. In-memory fakes live in the `fakes`
//! module; the GitLab and Dex crates provide the production implementations.

use async_trait::async_trait;

use crate::domain::{ClientRecord, MergeRequest};
use crate::error::{RegistryResult, SourceResult};

/// Source of truth for which merge requests are open.
///
/// Implementations must return the complete set in one call, paging
/// internally if the backend paginates.
#[async_trait]
pub trait MergeRequestSource: Send + Sync {
    async fn list_open(&self) -> SourceResult<Vec<MergeRequest>>;
}

/// OIDC client registry.
///
/// Guarantees expected by the reconciler:
/// - `create_client` fails with `AlreadyExists` when the id is taken.
/// - `delete_client` fails with `NotFound` when the id is unknown.
/// - channel failures surface as `Transport`, never as a business error.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// List every client the registry knows about.
    async fn list_clients(&self) -> RegistryResult<Vec<ClientRecord>>;

    /// Register a client and return it as stored.
    async fn create_client(&self, client: ClientRecord) -> RegistryResult<ClientRecord>;

    /// Remove a client by id.
    async fn delete_client(&self, id: &str) -> RegistryResult<()>;
}
