//! Scenario: live-collection refresh outcomes.
//!
//! # Invariants under test
//!
//! - A fresh latest snapshot short-circuits: no collection is started.
//! - Success is judged by the snapshot list after polling, not by the
//!   collection call: an unchanged latest id is failed/unchanged even
//!   when a collection started and the poll loop ran to completion.
//! - The wait budget is a saturating remaining-seconds counter consulted
//!   between status checks; exhaustion exits the loop without faulting.
//! - A start rejection fails immediately with zero polls.
//!
//! The clock is simulated; no test sleeps for real.

use fwd_api::{ApiError, CheckRecord, ForwardApi, Network, Snapshot};
use fwd_snapshot::{ensure_fresh, Clock, RefreshFailure, RefreshMode, RefreshOutcome};
use serde_json::Value;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeClock {
    now_ms: Mutex<i64>,
    sleeps: Mutex<Vec<u64>>,
}

impl FakeClock {
    fn at(now_ms: i64) -> Self {
        Self {
            now_ms: Mutex::new(now_ms),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    fn sleep_count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> i64 {
        *self.now_ms.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration.as_secs());
        *self.now_ms.lock().unwrap() += duration.as_millis() as i64;
    }
}

struct FakeServer {
    /// Successive answers to `list_snapshots`; the last entry repeats.
    snapshot_lists: Mutex<VecDeque<Vec<Snapshot>>>,
    start_accepts: bool,
    start_calls: Mutex<u32>,
    /// Number of `collection_in_progress` polls answered `true` before
    /// completion. `u32::MAX` never completes.
    busy_polls: Mutex<u32>,
}

impl FakeServer {
    fn new(snapshot_lists: Vec<Vec<Snapshot>>, busy_polls: u32) -> Self {
        Self {
            snapshot_lists: Mutex::new(snapshot_lists.into()),
            start_accepts: true,
            start_calls: Mutex::new(0),
            busy_polls: Mutex::new(busy_polls),
        }
    }
}

impl ForwardApi for FakeServer {
    fn list_networks(&self) -> Result<Vec<Network>, ApiError> {
        panic!("not exercised")
    }

    fn list_snapshots(&self, _: i64) -> Result<Vec<Snapshot>, ApiError> {
        let mut lists = self.snapshot_lists.lock().unwrap();
        if lists.len() > 1 {
            Ok(lists.pop_front().unwrap())
        } else {
            Ok(lists.front().cloned().unwrap_or_default())
        }
    }

    fn start_collection(&self, _: i64, _: Option<&[String]>) -> Result<bool, ApiError> {
        *self.start_calls.lock().unwrap() += 1;
        Ok(self.start_accepts)
    }

    fn collection_in_progress(&self, _: i64) -> Result<bool, ApiError> {
        let mut busy = self.busy_polls.lock().unwrap();
        if *busy == 0 {
            return Ok(false);
        }
        if *busy != u32::MAX {
            *busy -= 1;
        }
        Ok(true)
    }

    fn upload_snapshot(&self, _: i64, _: &str, _: &Path) -> Result<Option<i64>, ApiError> {
        panic!("not exercised")
    }
    fn list_checks(&self, _: i64) -> Result<Vec<CheckRecord>, ApiError> {
        panic!("not exercised")
    }
    fn get_check(&self, _: i64, _: i64) -> Result<Option<CheckRecord>, ApiError> {
        panic!("not exercised")
    }
    fn create_check(&self, _: i64, _: &Value) -> Result<CheckRecord, ApiError> {
        panic!("not exercised")
    }
    fn delete_check(&self, _: i64, _: i64) -> Result<(), ApiError> {
        panic!("not exercised")
    }
}

fn snap(id: i64, created_ms: i64) -> Snapshot {
    Snapshot {
        id,
        creation_time_ms: created_ms,
    }
}

fn collect_all() -> RefreshMode {
    RefreshMode::Collect { devices: None }
}

const BASE: &str = "https://fwd.example";

// ---------------------------------------------------------------------------
// 1. Fresh latest short-circuits before any collection
// ---------------------------------------------------------------------------

#[test]
fn fresh_snapshot_skips_collection_entirely() {
    let server = FakeServer::new(vec![vec![snap(100, 1_000_000)]], 0);
    let clock = FakeClock::at(1_000_000 + 60_000); // one minute old

    let outcome = ensure_fresh(&server, &clock, BASE, 3, 600, &collect_all(), None).unwrap();

    assert_eq!(
        outcome,
        RefreshOutcome::Fresh {
            snapshot_id: 100,
            link: "https://fwd.example/?/search?networkId=3&snapshotId=100".to_string(),
        }
    );
    assert_eq!(*server.start_calls.lock().unwrap(), 0);
    assert_eq!(clock.sleep_count(), 0);
}

// ---------------------------------------------------------------------------
// 2. Completed poll with an unchanged latest id is failed/unchanged
// ---------------------------------------------------------------------------

#[test]
fn unchanged_latest_id_after_poll_is_a_failure() {
    // Stale before; afterwards the list still has snapshot 100 as latest.
    let server = FakeServer::new(
        vec![vec![snap(100, 1_000_000)], vec![snap(100, 1_000_000)]],
        2,
    );
    let clock = FakeClock::at(1_000_000 + 700_000); // older than the 600s budget

    let outcome = ensure_fresh(&server, &clock, BASE, 3, 600, &collect_all(), None).unwrap();

    assert_eq!(outcome, RefreshOutcome::Failed(RefreshFailure::NoNewSnapshot));
    assert_eq!(*server.start_calls.lock().unwrap(), 1, "the collection did start");
    assert_eq!(clock.sleep_count(), 2, "the poll loop did run to completion");
}

// ---------------------------------------------------------------------------
// 3. A genuinely new snapshot reports changed with its deep-link
// ---------------------------------------------------------------------------

#[test]
fn new_snapshot_after_collection_reports_refreshed() {
    let server = FakeServer::new(
        vec![
            vec![snap(100, 1_000_000)],
            vec![snap(100, 1_000_000), snap(101, 2_000_000)],
        ],
        3,
    );
    let clock = FakeClock::at(1_000_000 + 700_000);

    let outcome = ensure_fresh(&server, &clock, BASE, 3, 600, &collect_all(), None).unwrap();

    assert_eq!(
        outcome,
        RefreshOutcome::Refreshed {
            snapshot_id: 101,
            link: "https://fwd.example/?/search?networkId=3&snapshotId=101".to_string(),
        }
    );
}

// ---------------------------------------------------------------------------
// 4. Wait budget exhaustion exits the loop without faulting
// ---------------------------------------------------------------------------

#[test]
fn wait_budget_exhaustion_stops_polling() {
    // Collection never completes; 25s budget allows three 10s sleeps
    // (25 -> 15 -> 5 -> 0) before the next status check exits the loop.
    let server = FakeServer::new(vec![vec![snap(100, 1_000_000)]], u32::MAX);
    let clock = FakeClock::at(1_000_000 + 700_000);

    let outcome = ensure_fresh(&server, &clock, BASE, 3, 600, &collect_all(), Some(25)).unwrap();

    assert_eq!(outcome, RefreshOutcome::Failed(RefreshFailure::NoNewSnapshot));
    assert_eq!(clock.sleep_count(), 3);
}

// ---------------------------------------------------------------------------
// 5. A rejected collection start fails with zero polls
// ---------------------------------------------------------------------------

#[test]
fn rejected_collection_start_fails_immediately() {
    let mut server = FakeServer::new(vec![vec![snap(100, 1_000_000)]], 5);
    server.start_accepts = false;
    let clock = FakeClock::at(1_000_000 + 700_000);

    let outcome = ensure_fresh(&server, &clock, BASE, 3, 600, &collect_all(), None).unwrap();

    assert_eq!(outcome, RefreshOutcome::Failed(RefreshFailure::CollectionRejected));
    assert_eq!(clock.sleep_count(), 0);
}

// ---------------------------------------------------------------------------
// 6. Empty history collects unconditionally and accepts the first snapshot
// ---------------------------------------------------------------------------

#[test]
fn empty_history_is_stale_and_first_snapshot_counts_as_new() {
    let server = FakeServer::new(vec![vec![], vec![snap(100, 2_000_000)]], 1);
    let clock = FakeClock::at(2_000_000);

    // Even a huge budget cannot make an empty history fresh.
    let outcome =
        ensure_fresh(&server, &clock, BASE, 3, 1_000_000, &collect_all(), None).unwrap();

    assert!(matches!(
        outcome,
        RefreshOutcome::Refreshed { snapshot_id: 100, .. }
    ));
}
