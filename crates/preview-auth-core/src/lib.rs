//! Preview Auth Core
//!
//! Reconciles ephemeral OIDC clients with the lifecycle of merge requests:
//! every open merge request gets a client named `mr-<iid>`, and the client is
//! removed once the merge request is closed or merged.
//!
//! The crate owns the domain types, the collaborator traits, the
//! [`Reconciler`] (one poll/diff/act cycle) and the [`Monitor`] (the
//! fixed-interval loop). Backends live in `preview-auth-gitlab` and
//! `preview-auth-dex`.

pub mod domain;
pub mod error;
pub mod fakes;
pub mod monitor;
pub mod obs;
pub mod reconciler;
pub mod telemetry;
pub mod traits;

pub use domain::{
    client_id_for, format_ids, generate_client_secret, parse_client_id, ClientRecord, KnownSet,
    MergeRequest, MergeRequestId, RedirectTemplate, RedirectTemplateError, CLIENT_ID_PREFIX,
    DEFAULT_REDIRECT_TEMPLATE,
};
pub use error::{RegistryError, RegistryResult, SourceError, SourceResult};
pub use monitor::{Monitor, DEFAULT_INTERVAL};
pub use reconciler::{CycleReport, EnsureOutcome, Reconciler, RemoveOutcome};
pub use telemetry::init_tracing;
pub use traits::{ClientRegistry, MergeRequestSource};
