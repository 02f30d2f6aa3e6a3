//! Fixed-interval polling loop around a [`Reconciler`].
//!
//! A plain timed loop: one cycle runs to completion, then the loop sleeps for
//! the configured interval. No jitter, no drift correction, no catch-up.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, Instrument};

use crate::domain::KnownSet;
use crate::obs;
use crate::reconciler::{CycleReport, Reconciler};

/// Interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

pub struct Monitor {
    reconciler: Reconciler,
    interval: Duration,
    seed_from_registry: bool,
}

impl Monitor {
    pub fn new(reconciler: Reconciler, interval: Duration) -> Self {
        Monitor {
            reconciler,
            interval,
            seed_from_registry: false,
        }
    }

    /// Start from the `mr-<n>` clients already in the registry instead of an
    /// empty set.
    pub fn with_seed_from_registry(mut self, seed: bool) -> Self {
        self.seed_from_registry = seed;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Known set for the first cycle. Seeding failures fall back to empty.
    pub async fn initial_known_set(&self) -> KnownSet {
        if !self.seed_from_registry {
            return KnownSet::new();
        }
        match self.reconciler.seed_known_set().await {
            Ok(known) => {
                obs::emit_known_set_seeded(&known);
                known
            }
            Err(error) => {
                obs::emit_seed_failed(&error);
                KnownSet::new()
            }
        }
    }

    /// One poll cycle inside a span stamped with its start time.
    pub async fn cycle(&self, previous: KnownSet) -> CycleReport {
        let started_at = Utc::now();
        obs::emit_cycle_started(started_at);
        self.reconciler
            .run_cycle(previous)
            .instrument(obs::cycle_span(started_at))
            .await
    }

    /// Run cycles until `shutdown` resolves and return the last known set.
    ///
    /// `shutdown` is raced against both the sleep and the in-flight cycle; an
    /// interrupted cycle leaves the known set as the previous cycle left it.
    pub async fn run_until<F>(&self, shutdown: F) -> KnownSet
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        // `biased`: shutdown is checked first so it wins ties.
        let mut known = tokio::select! {
            biased;
            _ = &mut shutdown => return KnownSet::new(),
            known = self.initial_known_set() => known,
        };

        info!(event = "monitor.initial_check", "performing initial check");
        tokio::select! {
            biased;
            _ = &mut shutdown => return known,
            report = self.cycle(known.clone()) => known = report.known,
        }
        info!(
            event = "monitor.started",
            open = known.len(),
            "monitoring {} open MR(s)",
            known.len()
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                report = self.cycle(known.clone()) => {
                    if !report.new_clients_created() {
                        info!(
                            event = "monitor.idle",
                            open = report.known.len(),
                            "no new MRs, currently monitoring {} open MR(s)",
                            report.known.len()
                        );
                    }
                    known = report.known;
                }
            }
        }

        known
    }
}
