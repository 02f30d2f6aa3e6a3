//! Poll, diff, act.
//!
//! One cycle lists the open merge requests, compares their ids against the
//! known set carried over from the previous cycle, ensures a client for every
//! newly opened MR and removes the client of every MR that disappeared.
//!
//! The known set is threaded through by value: [`Reconciler::run_cycle`] takes
//! the previous set and hands back the next one inside a [`CycleReport`].
//! Registry calls are best-effort. A failed create or delete is logged and
//! reported but does not stop the set from moving to the freshly polled ids,
//! so the set can drift from the registry until the MR changes state again.

use std::sync::Arc;

use crate::domain::{
    client_id_for, ClientRecord, KnownSet, MergeRequest, MergeRequestId, RedirectTemplate,
};
use crate::error::{RegistryError, RegistryResult, SourceError, SourceResult};
use crate::obs;
use crate::traits::{ClientRegistry, MergeRequestSource};

/// Result of [`Reconciler::ensure_client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// A new client was registered.
    Created(ClientRecord),
    /// A client with the derived id already existed; nothing was sent.
    Skipped,
    /// The existence check or the create call failed.
    Failed(RegistryError),
}

/// Result of [`Reconciler::remove_client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    Failed(RegistryError),
}

/// What one poll cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Known set to carry into the next cycle.
    pub known: KnownSet,
    pub created: Vec<MergeRequestId>,
    pub skipped: Vec<MergeRequestId>,
    pub create_failed: Vec<(MergeRequestId, RegistryError)>,
    pub deleted: Vec<MergeRequestId>,
    pub delete_failed: Vec<(MergeRequestId, RegistryError)>,
    /// Set when the listing failed; `known` is then the previous set untouched.
    pub poll_error: Option<SourceError>,
}

impl CycleReport {
    fn unchanged(previous: KnownSet, error: SourceError) -> Self {
        CycleReport {
            known: previous,
            poll_error: Some(error),
            ..Default::default()
        }
    }

    /// True when at least one client was registered this cycle.
    pub fn new_clients_created(&self) -> bool {
        !self.created.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.create_failed.len() + self.delete_failed.len() + usize::from(self.poll_error.is_some())
    }

    /// True when no registry call was attempted.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
            && self.skipped.is_empty()
            && self.create_failed.is_empty()
            && self.deleted.is_empty()
            && self.delete_failed.is_empty()
    }
}

/// Keeps one registry client per open merge request.
pub struct Reconciler {
    source: Arc<dyn MergeRequestSource>,
    registry: Arc<dyn ClientRegistry>,
    redirect: RedirectTemplate,
}

impl Reconciler {
    pub fn new(
        source: Arc<dyn MergeRequestSource>,
        registry: Arc<dyn ClientRegistry>,
        redirect: RedirectTemplate,
    ) -> Self {
        Reconciler {
            source,
            registry,
            redirect,
        }
    }

    pub fn redirect_template(&self) -> &RedirectTemplate {
        &self.redirect
    }

    /// List every open merge request.
    pub async fn poll(&self) -> SourceResult<Vec<MergeRequest>> {
        self.source.list_open().await
    }

    /// Poll and reconcile. A failed poll returns `previous` unchanged and
    /// makes no registry call.
    pub async fn run_cycle(&self, previous: KnownSet) -> CycleReport {
        match self.poll().await {
            Ok(snapshot) => self.reconcile(&previous, &snapshot).await,
            Err(error) => {
                obs::emit_poll_failed(&error);
                CycleReport::unchanged(previous, error)
            }
        }
    }

    /// Diff `snapshot` against `previous` and act on the difference.
    ///
    /// Exactly one [`ensure_client`](Self::ensure_client) per id in
    /// `current - previous` and one [`remove_client`](Self::remove_client)
    /// per id in `previous - current`. Ids present in both are left alone.
    pub async fn reconcile(&self, previous: &KnownSet, snapshot: &[MergeRequest]) -> CycleReport {
        let mut report = CycleReport::default();

        for mr in snapshot {
            // Duplicate entries in one listing count once.
            if !report.known.insert(mr.id) || previous.contains(&mr.id) {
                continue;
            }
            obs::emit_mr_detected(mr.id, &mr.title);
            match self.ensure_client(mr).await {
                EnsureOutcome::Created(_) => report.created.push(mr.id),
                EnsureOutcome::Skipped => report.skipped.push(mr.id),
                EnsureOutcome::Failed(error) => report.create_failed.push((mr.id, error)),
            }
        }

        let closed: KnownSet = previous.difference(&report.known).copied().collect();
        if !closed.is_empty() {
            obs::emit_mrs_closed(&closed);
            for id in closed {
                match self.remove_client(id).await {
                    RemoveOutcome::Deleted => report.deleted.push(id),
                    RemoveOutcome::Failed(error) => report.delete_failed.push((id, error)),
                }
            }
        }

        obs::emit_cycle_finished(
            report.known.len(),
            report.created.len(),
            report.deleted.len(),
            report.failure_count(),
        );
        report
    }

    /// Whether the registry already holds a client with this id.
    pub async fn client_exists(&self, client_id: &str) -> RegistryResult<bool> {
        let clients = self.registry.list_clients().await?;
        Ok(clients.iter().any(|client| client.id == client_id))
    }

    /// Register the client for `mr` unless one already exists.
    ///
    /// A failing existence check aborts: absence is never assumed.
    pub async fn ensure_client(&self, mr: &MergeRequest) -> EnsureOutcome {
        let client_id = client_id_for(mr.id);

        match self.client_exists(&client_id).await {
            Ok(true) => {
                obs::emit_client_skipped(mr.id, &client_id);
                return EnsureOutcome::Skipped;
            }
            Ok(false) => {}
            Err(error) => {
                obs::emit_client_create_failed(mr.id, &client_id, &error);
                return EnsureOutcome::Failed(error);
            }
        }

        let redirect_uri = self.redirect.render(mr.id);
        let record = ClientRecord::for_merge_request(mr, &self.redirect);
        match self.registry.create_client(record).await {
            Ok(created) => {
                obs::emit_client_created(mr.id, &created.id, &created.name, &redirect_uri);
                EnsureOutcome::Created(created)
            }
            Err(error) => {
                obs::emit_client_create_failed(mr.id, &client_id, &error);
                EnsureOutcome::Failed(error)
            }
        }
    }

    /// Delete the client of a closed merge request.
    pub async fn remove_client(&self, id: MergeRequestId) -> RemoveOutcome {
        let client_id = client_id_for(id);
        match self.registry.delete_client(&client_id).await {
            Ok(()) => {
                obs::emit_client_deleted(id, &client_id);
                RemoveOutcome::Deleted
            }
            Err(error) => {
                obs::emit_client_delete_failed(id, &client_id, &error);
                RemoveOutcome::Failed(error)
            }
        }
    }

    /// Rebuild a known set from the registry: every client named `mr-<n>`.
    ///
    /// Lets a restarted process notice MRs that closed while it was down.
    pub async fn seed_known_set(&self) -> RegistryResult<KnownSet> {
        let clients = self.registry.list_clients().await?;
        Ok(clients
            .iter()
            .filter_map(ClientRecord::merge_request_id)
            .collect())
    }
}
