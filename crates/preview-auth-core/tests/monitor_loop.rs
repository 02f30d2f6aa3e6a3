//! Polling loop tests on a paused tokio clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use preview_auth_core::fakes::{MemoryClientRegistry, MemoryMergeRequestSource};
use preview_auth_core::{
    ClientRecord, ClientRegistry, KnownSet, MergeRequest, MergeRequestId, MergeRequestSource,
    Monitor, RedirectTemplate, Reconciler, RegistryError, RegistryResult, SourceError,
    SourceResult,
};

fn monitor(
    interval_secs: u64,
) -> (
    Monitor,
    Arc<MemoryMergeRequestSource>,
    Arc<MemoryClientRegistry>,
) {
    let source = Arc::new(MemoryMergeRequestSource::new());
    let registry = Arc::new(MemoryClientRegistry::new());
    let reconciler = Reconciler::new(
        source.clone(),
        registry.clone(),
        RedirectTemplate::default(),
    );
    (
        Monitor::new(reconciler, Duration::from_secs(interval_secs)),
        source,
        registry,
    )
}

#[tokio::test(start_paused = true)]
async fn polls_once_up_front_then_every_interval() {
    let (monitor, source, _) = monitor(30);

    // initial check at t=0, then t=30, 60, 90; shutdown at t=95
    monitor
        .run_until(tokio::time::sleep(Duration::from_secs(95)))
        .await;

    assert_eq!(source.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn follows_merge_requests_opening_and_closing() {
    let (monitor, source, registry) = monitor(10);
    source.open(1, "first");

    let mutator = {
        let source = source.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            source.open(2, "second");
            tokio::time::sleep(Duration::from_secs(10)).await;
            source.close(1);
        })
    };

    let known = monitor
        .run_until(tokio::time::sleep(Duration::from_secs(45)))
        .await;
    mutator.await.unwrap();

    assert_eq!(known, [MergeRequestId(2)].into_iter().collect::<KnownSet>());
    assert_eq!(registry.creates(), vec!["mr-1".to_string(), "mr-2".to_string()]);
    assert_eq!(registry.deletes(), vec!["mr-1".to_string()]);
    assert_eq!(registry.client_ids(), vec!["mr-2".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn listing_outage_keeps_clients_until_recovery() {
    let (monitor, source, registry) = monitor(10);
    source.open(7, "fix bug");

    let outage = {
        let source = source.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            source.fail_always(SourceError::Transport("gitlab down".into()));
            tokio::time::sleep(Duration::from_secs(20)).await;
            source.recover();
        })
    };

    let known = monitor
        .run_until(tokio::time::sleep(Duration::from_secs(35)))
        .await;
    outage.await.unwrap();

    assert_eq!(known, [MergeRequestId(7)].into_iter().collect::<KnownSet>());
    assert!(registry.deletes().is_empty());
    assert_eq!(registry.creates(), vec!["mr-7".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn seeding_from_registry_cleans_up_stale_clients() {
    let (monitor, source, registry) = monitor(30);
    let monitor = monitor.with_seed_from_registry(true);
    registry.insert(ClientRecord::for_merge_request(
        &MergeRequest::new(3, "closed while down"),
        &RedirectTemplate::default(),
    ));

    let known = monitor
        .run_until(tokio::time::sleep(Duration::from_secs(1)))
        .await;

    assert!(known.is_empty());
    assert_eq!(source.calls(), 1);
    assert_eq!(registry.deletes(), vec!["mr-3".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn seeding_failure_starts_empty() {
    let (monitor, _, registry) = monitor(30);
    let monitor = monitor.with_seed_from_registry(true);
    registry.fail_list(Some(RegistryError::Transport("dex down".into())));

    assert!(monitor.initial_known_set().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_before_start_returns_empty() {
    let (monitor, source, _) = monitor(30);

    let known = monitor.run_until(std::future::ready(())).await;

    assert!(known.is_empty());
    assert_eq!(source.calls(), 0);
}

/// Answers the first listing, then never returns.
#[derive(Default)]
struct StallingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl MergeRequestSource for StallingSource {
    async fn list_open(&self) -> SourceResult<Vec<MergeRequest>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(vec![MergeRequest::new(1, "first")]);
        }
        std::future::pending().await
    }
}

/// Registry whose calls never complete.
#[derive(Default)]
struct StalledRegistry {
    calls: AtomicUsize,
}

#[async_trait]
impl ClientRegistry for StalledRegistry {
    async fn list_clients(&self) -> RegistryResult<Vec<ClientRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn create_client(&self, _client: ClientRecord) -> RegistryResult<ClientRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn delete_client(&self, _id: &str) -> RegistryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_listing_blocks_the_loop_until_shutdown() {
    let source = Arc::new(StallingSource::default());
    let registry = Arc::new(MemoryClientRegistry::new());
    let reconciler = Reconciler::new(
        source.clone(),
        registry.clone(),
        RedirectTemplate::default(),
    );
    let monitor = Monitor::new(reconciler, Duration::from_secs(30));

    // initial check at t=0 succeeds, the poll at t=30 never returns
    let known = monitor
        .run_until(tokio::time::sleep(Duration::from_secs(100)))
        .await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(known, [MergeRequestId(1)].into_iter().collect::<KnownSet>());
    assert_eq!(registry.creates(), vec!["mr-1".to_string()]);
    assert!(registry.deletes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stalled_registry_blocks_the_loop_until_shutdown() {
    let source = Arc::new(MemoryMergeRequestSource::new());
    source.open(4, "stuck");
    let registry = Arc::new(StalledRegistry::default());
    let reconciler = Reconciler::new(
        source.clone(),
        registry.clone(),
        RedirectTemplate::default(),
    );
    let monitor = Monitor::new(reconciler, Duration::from_secs(10));

    let known = monitor
        .run_until(tokio::time::sleep(Duration::from_secs(100)))
        .await;

    // the existence check of the initial cycle hangs; nothing else runs
    assert_eq!(source.calls(), 1);
    assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
    assert!(known.is_empty());
}
