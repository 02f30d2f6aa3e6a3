//! Structured lifecycle events for the reconciliation loop.
//!
//! Every event carries an `event` field (`cycle.started`, `mr.detected`,
//! `client.created`, ...) together with the merge request and client id it
//! concerns, so a line read in isolation still says what happened to which MR.
//!
//! Events are emitted at `info!` (failures at `warn!`); filter with `RUST_LOG`.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{format_ids, KnownSet, MergeRequestId};
use crate::error::{RegistryError, SourceError};

/// Span tagging every event of one poll cycle with its start time.
pub fn cycle_span(started_at: DateTime<Utc>) -> tracing::Span {
    tracing::info_span!(
        "preview_auth.cycle",
        at = %started_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Start of a poll cycle.
pub fn emit_cycle_started(started_at: DateTime<Utc>) {
    info!(
        event = "cycle.started",
        at = %started_at.format("%Y-%m-%d %H:%M:%S"),
        "checking for new MRs"
    );
}

/// A merge request not in the known set showed up in the listing.
pub fn emit_mr_detected(id: MergeRequestId, title: &str) {
    info!(event = "mr.detected", mr = %id, title = %title, "new MR detected");
}

/// A client was registered for a newly opened MR.
pub fn emit_client_created(id: MergeRequestId, client_id: &str, name: &str, redirect_uri: &str) {
    info!(
        event = "client.created",
        mr = %id,
        client_id = %client_id,
        name = %name,
        redirect_uri = %redirect_uri,
        "created client"
    );
}

/// The derived client already existed; no create was sent.
pub fn emit_client_skipped(id: MergeRequestId, client_id: &str) {
    info!(
        event = "client.skipped",
        mr = %id,
        client_id = %client_id,
        "client already exists, skipping"
    );
}

/// Existence check or create failed for an MR.
pub fn emit_client_create_failed(id: MergeRequestId, client_id: &str, error: &RegistryError) {
    warn!(
        event = "client.create_failed",
        mr = %id,
        client_id = %client_id,
        error = %error,
        "failed to create client"
    );
}

/// MRs that dropped out of the listing since the last cycle.
pub fn emit_mrs_closed(ids: &KnownSet) {
    info!(event = "mr.closed", mrs = %format_ids(ids), "MRs no longer open");
}

/// The client of a closed MR was removed.
pub fn emit_client_deleted(id: MergeRequestId, client_id: &str) {
    info!(event = "client.deleted", mr = %id, client_id = %client_id, "deleted client");
}

/// Deleting the client of a closed MR failed.
pub fn emit_client_delete_failed(id: MergeRequestId, client_id: &str, error: &RegistryError) {
    warn!(
        event = "client.delete_failed",
        mr = %id,
        client_id = %client_id,
        error = %error,
        "failed to delete client"
    );
}

/// Listing failed; the cycle is skipped.
pub fn emit_poll_failed(error: &SourceError) {
    warn!(event = "poll.failed", error = %error, "merge request listing failed, keeping known set");
}

/// End-of-cycle summary.
pub fn emit_cycle_finished(known: usize, created: usize, deleted: usize, failures: usize) {
    info!(
        event = "cycle.finished",
        known = known,
        created = created,
        deleted = deleted,
        failures = failures,
    );
}

/// Known set rebuilt from the registry at startup.
pub fn emit_known_set_seeded(known: &KnownSet) {
    info!(
        event = "known_set.seeded",
        count = known.len(),
        mrs = %format_ids(known),
        "seeded known MRs from registry"
    );
}

/// Seeding from the registry failed; starting empty.
pub fn emit_seed_failed(error: &RegistryError) {
    warn!(event = "known_set.seed_failed", error = %error, "could not seed known MRs, starting empty");
}
