//! Reconciliation scenarios against the in-memory fakes.
//!
//! Covers the diff contract (one ensure per new id, one remove per closed id,
//! nothing for ids present on both sides), fault isolation, and the behaviour
//! when the merge-request listing fails.

use std::sync::Arc;

use preview_auth_core::fakes::{MemoryClientRegistry, MemoryMergeRequestSource, RegistryCall};
use preview_auth_core::{
    ClientRecord, KnownSet, MergeRequest, MergeRequestId, RedirectTemplate, Reconciler,
    RegistryError, SourceError,
};

struct Harness {
    reconciler: Reconciler,
    source: Arc<MemoryMergeRequestSource>,
    registry: Arc<MemoryClientRegistry>,
}

fn harness() -> Harness {
    let source = Arc::new(MemoryMergeRequestSource::new());
    let registry = Arc::new(MemoryClientRegistry::new());
    let reconciler = Reconciler::new(
        source.clone(),
        registry.clone(),
        RedirectTemplate::default(),
    );
    Harness {
        reconciler,
        source,
        registry,
    }
}

fn ids(raw: &[u64]) -> KnownSet {
    raw.iter().copied().map(MergeRequestId).collect()
}

fn client_ids(raw: &[u64]) -> Vec<String> {
    raw.iter().map(|n| format!("mr-{n}")).collect()
}

#[tokio::test]
async fn new_merge_request_gets_a_client() {
    let h = harness();
    h.source.open(7, "fix bug");

    let report = h.reconciler.run_cycle(KnownSet::new()).await;

    assert_eq!(report.known, ids(&[7]));
    assert_eq!(report.created, vec![MergeRequestId(7)]);
    let client = h.registry.client("mr-7").expect("client mr-7 created");
    assert!(client.name.contains('7'));
    assert!(client.name.contains("fix bug"));
    assert_eq!(
        client.redirect_uris,
        vec!["https://mr-7.preview.example.com/callback".to_string()]
    );
}

#[tokio::test]
async fn closed_merge_request_loses_its_client() {
    let h = harness();
    h.source.open(7, "fix bug");
    let known = h.reconciler.run_cycle(KnownSet::new()).await.known;

    h.source.close(7);
    h.registry.clear_calls();
    let report = h.reconciler.run_cycle(known).await;

    assert!(report.known.is_empty());
    assert_eq!(report.deleted, vec![MergeRequestId(7)]);
    assert_eq!(h.registry.deletes(), client_ids(&[7]));
    assert!(!h.registry.contains("mr-7"));
}

#[tokio::test]
async fn unchanged_listing_makes_no_registry_call() {
    let h = harness();
    h.source.open(7, "fix bug");

    let report = h.reconciler.run_cycle(ids(&[7])).await;

    assert_eq!(report.known, ids(&[7]));
    assert!(report.is_noop());
    assert!(h.registry.calls().is_empty());
}

#[tokio::test]
async fn listing_failure_preserves_known_set_and_skips_registry() {
    let h = harness();
    h.source
        .fail_next(SourceError::Transport("connection refused".into()));

    let report = h.reconciler.run_cycle(ids(&[7])).await;

    assert_eq!(report.known, ids(&[7]));
    assert_eq!(
        report.poll_error,
        Some(SourceError::Transport("connection refused".into()))
    );
    assert!(h.registry.calls().is_empty());
}

#[tokio::test]
async fn diff_touches_only_the_symmetric_difference() {
    let h = harness();
    let previous = ids(&[1, 2, 3, 4]);
    for n in [1u64, 2, 3, 4] {
        h.registry.insert(ClientRecord::for_merge_request(
            &MergeRequest::new(n, "old"),
            &RedirectTemplate::default(),
        ));
    }
    h.source.set_open(vec![
        MergeRequest::new(3, "kept"),
        MergeRequest::new(4, "kept"),
        MergeRequest::new(5, "new"),
        MergeRequest::new(6, "new"),
    ]);

    let report = h.reconciler.run_cycle(previous).await;

    assert_eq!(report.known, ids(&[3, 4, 5, 6]));
    assert_eq!(h.registry.creates(), client_ids(&[5, 6]));
    let mut deletes = h.registry.deletes();
    deletes.sort();
    assert_eq!(deletes, client_ids(&[1, 2]));
    assert_eq!(h.registry.client_ids(), client_ids(&[3, 4, 5, 6]));
}

#[tokio::test]
async fn one_failed_delete_does_not_block_the_others() {
    let h = harness();
    for n in [10u64, 11, 12] {
        h.registry.insert(ClientRecord::for_merge_request(
            &MergeRequest::new(n, "t"),
            &RedirectTemplate::default(),
        ));
    }
    h.registry
        .fail_delete_for("mr-11", RegistryError::Transport("deadline".into()));

    let report = h.reconciler.run_cycle(ids(&[10, 11, 12])).await;

    let mut attempted = h.registry.deletes();
    attempted.sort();
    assert_eq!(attempted, client_ids(&[10, 11, 12]));
    assert_eq!(report.deleted.len(), 2);
    assert_eq!(
        report.delete_failed,
        vec![(
            MergeRequestId(11),
            RegistryError::Transport("deadline".into())
        )]
    );
    // best effort: the set shrinks anyway
    assert!(report.known.is_empty());
}

#[tokio::test]
async fn one_failed_create_does_not_block_the_others() {
    let h = harness();
    h.source.set_open(vec![
        MergeRequest::new(1, "a"),
        MergeRequest::new(2, "b"),
        MergeRequest::new(3, "c"),
    ]);
    h.registry
        .fail_create_for("mr-2", RegistryError::Transport("unavailable".into()));

    let report = h.reconciler.run_cycle(KnownSet::new()).await;

    assert_eq!(h.registry.creates(), client_ids(&[1, 2, 3]));
    assert_eq!(report.created, vec![MergeRequestId(1), MergeRequestId(3)]);
    assert_eq!(report.create_failed.len(), 1);
    assert_eq!(report.known, ids(&[1, 2, 3]));
}

#[tokio::test]
async fn restart_with_existing_client_skips_creation() {
    let h = harness();
    h.registry.insert(ClientRecord::for_merge_request(
        &MergeRequest::new(7, "fix bug"),
        &RedirectTemplate::default(),
    ));
    h.source.open(7, "fix bug");

    // fresh process: known set starts empty
    let report = h.reconciler.run_cycle(KnownSet::new()).await;

    assert_eq!(report.skipped, vec![MergeRequestId(7)]);
    assert!(h.registry.creates().is_empty());
    assert_eq!(h.registry.calls(), vec![RegistryCall::List]);
}

#[tokio::test]
async fn seeding_lets_a_restart_remove_stale_clients() {
    let h = harness();
    for n in [7u64, 8] {
        h.registry.insert(ClientRecord::for_merge_request(
            &MergeRequest::new(n, "t"),
            &RedirectTemplate::default(),
        ));
    }
    // MR 8 closed while the process was down
    h.source.open(7, "t");

    let seeded = h.reconciler.seed_known_set().await.unwrap();
    let report = h.reconciler.run_cycle(seeded).await;

    assert_eq!(report.known, ids(&[7]));
    assert_eq!(report.deleted, vec![MergeRequestId(8)]);
    assert_eq!(h.registry.client_ids(), client_ids(&[7]));
}

#[tokio::test]
async fn diff_property_over_many_set_pairs() {
    // Small exhaustive sweep over subsets of {1..5} for prev and current.
    let universe = [1u64, 2, 3, 4, 5];
    for prev_mask in 0u32..32 {
        for cur_mask in 0u32..32 {
            let pick = |mask: u32| -> Vec<u64> {
                universe
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, n)| *n)
                    .collect()
            };
            let prev = pick(prev_mask);
            let cur = pick(cur_mask);

            let h = harness();
            for n in &prev {
                h.registry.insert(ClientRecord::for_merge_request(
                    &MergeRequest::new(*n, "t"),
                    &RedirectTemplate::default(),
                ));
            }
            h.source
                .set_open(cur.iter().map(|n| MergeRequest::new(*n, "t")).collect());

            let report = h.reconciler.run_cycle(ids(&prev)).await;

            let expected_creates: Vec<u64> =
                cur.iter().copied().filter(|n| !prev.contains(n)).collect();
            let expected_deletes: Vec<u64> =
                prev.iter().copied().filter(|n| !cur.contains(n)).collect();

            assert_eq!(h.registry.creates(), client_ids(&expected_creates));
            let mut deletes = h.registry.deletes();
            deletes.sort();
            assert_eq!(deletes, client_ids(&expected_deletes));
            assert_eq!(report.known, ids(&cur));
        }
    }
}
