//! Refresh orchestration: acquire a new snapshot when the latest is stale.

use crate::clock::Clock;
use crate::freshness::{freshness, latest_snapshot, Freshness};
use fwd_api::{ApiError, ForwardApi};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Fixed pause between collection status polls.
pub const POLL_INTERVAL_SECS: u64 = 10;

/// How a new snapshot is acquired when the latest is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshMode {
    /// Live collection, optionally restricted to a device subset.
    Collect { devices: Option<Vec<String>> },
    /// Upload a pre-built artifact instead of collecting.
    Mock { name: String, path: PathBuf },
}

/// Why a refresh reported failed/unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshFailure {
    /// The server reported it could not begin a collection.
    CollectionRejected,
    /// Polling finished (completion or wait budget exhausted) but the
    /// latest snapshot id did not change — no new snapshot materialized.
    /// Distinguishable from an explicit rejection by the absence of a
    /// remote error.
    NoNewSnapshot,
    /// The artifact upload produced no usable snapshot id.
    UploadFailed,
}

impl RefreshFailure {
    /// Stable machine-checkable reason string for task reports.
    pub fn reason(&self) -> &'static str {
        match self {
            RefreshFailure::CollectionRejected => "collection-rejected",
            RefreshFailure::NoNewSnapshot => "no-new-snapshot",
            RefreshFailure::UploadFailed => "upload-failed",
        }
    }
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshFailure::CollectionRejected => {
                write!(f, "the server could not begin a collection")
            }
            RefreshFailure::NoNewSnapshot => {
                write!(f, "no new snapshot appeared after the collection poll")
            }
            RefreshFailure::UploadFailed => {
                write!(f, "snapshot artifact upload produced no snapshot id")
            }
        }
    }
}

/// Outcome of [`ensure_fresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The existing latest snapshot is within budget; nothing changed.
    Fresh { snapshot_id: i64, link: String },
    /// A new snapshot was acquired.
    Refreshed { snapshot_id: i64, link: String },
    /// Stale, but no new snapshot was produced; unchanged.
    Failed(RefreshFailure),
}

/// UI deep-link for a snapshot.
pub fn deep_link(base_url: &str, network_id: i64, snapshot_id: i64) -> String {
    format!(
        "{}/?/search?networkId={}&snapshotId={}",
        base_url.trim_end_matches('/'),
        network_id,
        snapshot_id
    )
}

/// Ensure the network's latest snapshot is no older than `budget_secs`.
///
/// Fresh short-circuits before any acquisition — including in mock mode,
/// where a fresh snapshot skips the upload entirely. When stale, collect
/// mode starts a collection and polls at [`POLL_INTERVAL_SECS`] until the
/// server reports completion or the optional `wait_secs` budget runs out
/// (`None` polls indefinitely); mock mode uploads the artifact. Either
/// way the result is judged by what the snapshot list actually shows
/// afterwards.
pub fn ensure_fresh(
    api: &dyn ForwardApi,
    clock: &dyn Clock,
    base_url: &str,
    network_id: i64,
    budget_secs: u64,
    mode: &RefreshMode,
    wait_secs: Option<u64>,
) -> Result<RefreshOutcome, ApiError> {
    let snapshots = api.list_snapshots(network_id)?;

    let prior_latest = match freshness(&snapshots, budget_secs, clock.now_ms()) {
        Freshness::Fresh { latest } => {
            return Ok(RefreshOutcome::Fresh {
                snapshot_id: latest.id,
                link: deep_link(base_url, network_id, latest.id),
            });
        }
        Freshness::Stale { prior_latest } => prior_latest,
    };

    let new_id = match mode {
        RefreshMode::Collect { devices } => {
            match collect(
                api,
                clock,
                network_id,
                devices.as_deref(),
                wait_secs,
                prior_latest.map(|s| s.id),
            )? {
                Ok(id) => id,
                Err(failure) => return Ok(RefreshOutcome::Failed(failure)),
            }
        }
        RefreshMode::Mock { name, path } => match api.upload_snapshot(network_id, name, path)? {
            Some(id) => id,
            None => return Ok(RefreshOutcome::Failed(RefreshFailure::UploadFailed)),
        },
    };

    Ok(RefreshOutcome::Refreshed {
        snapshot_id: new_id,
        link: deep_link(base_url, network_id, new_id),
    })
}

/// Start a collection and poll it to the end of the wait budget, then
/// judge success by the snapshot list. The inner `Result` separates a
/// structured refresh failure from a transport/server fault.
fn collect(
    api: &dyn ForwardApi,
    clock: &dyn Clock,
    network_id: i64,
    devices: Option<&[String]>,
    wait_secs: Option<u64>,
    prior_latest_id: Option<i64>,
) -> Result<Result<i64, RefreshFailure>, ApiError> {
    if !api.start_collection(network_id, devices)? {
        return Ok(Err(RefreshFailure::CollectionRejected));
    }

    // Remaining wait budget in seconds; saturates at zero, never negative.
    // The budget is consulted between status checks only — an in-flight
    // collection is not interrupted.
    let mut remaining = wait_secs;
    while api.collection_in_progress(network_id)? {
        if remaining == Some(0) {
            break;
        }
        clock.sleep(Duration::from_secs(POLL_INTERVAL_SECS));
        if let Some(r) = remaining.as_mut() {
            *r = r.saturating_sub(POLL_INTERVAL_SECS);
        }
    }

    let snapshots = api.list_snapshots(network_id)?;
    match latest_snapshot(&snapshots) {
        None => Ok(Err(RefreshFailure::NoNewSnapshot)),
        Some(latest) if Some(latest.id) == prior_latest_id => {
            Ok(Err(RefreshFailure::NoNewSnapshot))
        }
        Some(latest) => Ok(Ok(latest.id)),
    }
}
