//! fwd-snapshot
//!
//! Snapshot freshness control.
//!
//! Architectural decisions:
//! - Freshness is decided from a caller-supplied "now"; the decision itself
//!   is pure and the clock is a trait so tests never sleep.
//! - "Latest" is always the maximum-creation-time snapshot; server list
//!   order is never trusted.
//! - The only internal loop is the collection poll (fixed 10 s interval,
//!   optional saturating wait budget). Everything else fails immediately.
//! - A refresh that produces no new snapshot id is a failure, even when the
//!   collection started and the poll ran to completion.

mod clock;
mod freshness;
mod refresh;

pub use clock::{Clock, SystemClock};
pub use freshness::{freshness, latest_snapshot, parse_freshness, Freshness, FreshnessParseError};
pub use refresh::{
    deep_link, ensure_fresh, RefreshFailure, RefreshMode, RefreshOutcome, POLL_INTERVAL_SECS,
};
