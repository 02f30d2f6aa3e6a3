//! In-memory fakes for the collaborator traits (testing only)
//!
//! Provides `MemoryMergeRequestSource` and `MemoryClientRegistry`, which honour
//! the trait contracts and let tests inject failures and inspect the calls
//! the reconciler made.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{ClientRecord, MergeRequest, MergeRequestId};
use crate::error::{RegistryError, RegistryResult, SourceError, SourceResult};
use crate::traits::{ClientRegistry, MergeRequestSource};

// ---------------------------------------------------------------------------
// MemoryMergeRequestSource
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SourceState {
    open: Vec<MergeRequest>,
    failure: Option<SourceError>,
    sticky: bool,
    calls: usize,
}

/// Merge-request source backed by a `Vec` the test mutates between cycles.
#[derive(Debug, Default)]
pub struct MemoryMergeRequestSource {
    state: Mutex<SourceState>,
}

impl MemoryMergeRequestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open(open: Vec<MergeRequest>) -> Self {
        let source = Self::default();
        source.set_open(open);
        source
    }

    /// Replace the whole listing.
    pub fn set_open(&self, open: Vec<MergeRequest>) {
        self.state.lock().unwrap().open = open;
    }

    pub fn open(&self, id: u64, title: &str) {
        self.state
            .lock()
            .unwrap()
            .open
            .push(MergeRequest::new(id, title));
    }

    pub fn close(&self, id: u64) {
        self.state
            .lock()
            .unwrap()
            .open
            .retain(|mr| mr.id != MergeRequestId(id));
    }

    /// Fail the next listing only.
    pub fn fail_next(&self, error: SourceError) {
        let mut state = self.state.lock().unwrap();
        state.failure = Some(error);
        state.sticky = false;
    }

    /// Fail every listing until [`recover`](Self::recover) is called.
    pub fn fail_always(&self, error: SourceError) {
        let mut state = self.state.lock().unwrap();
        state.failure = Some(error);
        state.sticky = true;
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failure = None;
    }

    /// Number of times `list_open` was called.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl MergeRequestSource for MemoryMergeRequestSource {
    async fn list_open(&self) -> SourceResult<Vec<MergeRequest>> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if let Some(error) = state.failure.clone() {
            if !state.sticky {
                state.failure = None;
            }
            return Err(error);
        }
        Ok(state.open.clone())
    }
}

// ---------------------------------------------------------------------------
// MemoryClientRegistry
// ---------------------------------------------------------------------------

/// A call observed by [`MemoryClientRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    List,
    Create(String),
    Delete(String),
}

#[derive(Debug, Default)]
struct RegistryState {
    clients: BTreeMap<String, ClientRecord>,
    list_failure: Option<RegistryError>,
    create_failures: HashMap<String, RegistryError>,
    delete_failures: HashMap<String, RegistryError>,
    calls: Vec<RegistryCall>,
}

/// Client registry backed by a `BTreeMap<client id, record>`.
#[derive(Debug, Default)]
pub struct MemoryClientRegistry {
    state: Mutex<RegistryState>,
}

impl MemoryClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clients(clients: impl IntoIterator<Item = ClientRecord>) -> Self {
        let registry = Self::default();
        for client in clients {
            registry.insert(client);
        }
        registry
    }

    /// Store a client directly, bypassing the call log.
    pub fn insert(&self, client: ClientRecord) {
        self.state
            .lock()
            .unwrap()
            .clients
            .insert(client.id.clone(), client);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.lock().unwrap().clients.contains_key(id)
    }

    pub fn client(&self, id: &str) -> Option<ClientRecord> {
        self.state.lock().unwrap().clients.get(id).cloned()
    }

    /// Stored client ids in sorted order.
    pub fn client_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().clients.keys().cloned().collect()
    }

    /// Make `list_clients` fail (or succeed again with `None`).
    pub fn fail_list(&self, error: Option<RegistryError>) {
        self.state.lock().unwrap().list_failure = error;
    }

    pub fn fail_create_for(&self, id: &str, error: RegistryError) {
        self.state
            .lock()
            .unwrap()
            .create_failures
            .insert(id.to_string(), error);
    }

    pub fn fail_delete_for(&self, id: &str, error: RegistryError) {
        self.state
            .lock()
            .unwrap()
            .delete_failures
            .insert(id.to_string(), error);
    }

    pub fn calls(&self) -> Vec<RegistryCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Ids passed to `create_client`, in call order.
    pub fn creates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RegistryCall::Create(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Ids passed to `delete_client`, in call order.
    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RegistryCall::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

#[async_trait]
impl ClientRegistry for MemoryClientRegistry {
    async fn list_clients(&self) -> RegistryResult<Vec<ClientRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RegistryCall::List);
        if let Some(error) = state.list_failure.clone() {
            return Err(error);
        }
        Ok(state.clients.values().cloned().collect())
    }

    async fn create_client(&self, client: ClientRecord) -> RegistryResult<ClientRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RegistryCall::Create(client.id.clone()));
        if let Some(error) = state.create_failures.get(&client.id) {
            return Err(error.clone());
        }
        if state.clients.contains_key(&client.id) {
            return Err(RegistryError::AlreadyExists(client.id));
        }
        state.clients.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    async fn delete_client(&self, id: &str) -> RegistryResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RegistryCall::Delete(id.to_string()));
        if let Some(error) = state.delete_failures.get(id) {
            return Err(error.clone());
        }
        state
            .clients
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }
}
