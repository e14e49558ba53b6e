//! fwd-api
//!
//! Client boundary for the Forward-style network-verification server.
//!
//! This crate owns the API trait, the wire DTOs and the concrete HTTP
//! client. It does **not** decide anything: reconciliation and freshness
//! logic live in `fwd-check` and `fwd-snapshot`, which talk to the server
//! exclusively through the [`ForwardApi`] trait so tests can substitute
//! in-process fakes.

mod http;
mod lookup;

pub use http::HttpForwardApi;
pub use lookup::{find_network_id, search_networks, NetworkMatch};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

/// A network as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: i64,
    pub name: String,
}

/// A point-in-time capture of a network.
///
/// The server lists snapshots in an unspecified order; callers that need
/// "latest" must select the maximum [`creation_time_ms`](Self::creation_time_ms)
/// element themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    /// Creation timestamp, epoch milliseconds UTC.
    #[serde(rename = "creationDateMillis")]
    pub creation_time_ms: i64,
}

/// A check as stored on a snapshot.
///
/// `definition` is kept as raw JSON: the reconciler compares definitions
/// structurally and must not lose fields it does not model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Server-allocated id. `None` marks an invalid/ambiguous record
    /// (e.g. a create response that allocated nothing).
    #[serde(default)]
    pub id: Option<i64>,
    pub definition: Value,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`ForwardApi`] implementation may return.
#[derive(Debug)]
pub enum ApiError {
    /// Network or transport failure.
    Transport(String),
    /// The server answered with a non-success status.
    Api { status: u16, message: String },
    /// A response payload could not be decoded.
    Decode(String),
    /// A client-side input problem (bad base URL, unreadable artifact file).
    Config(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Api { status, message } => {
                write!(f, "server error status={status}: {message}")
            }
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

// ---------------------------------------------------------------------------
// API trait
// ---------------------------------------------------------------------------

/// Remote-server contract.
///
/// Object-safe so callers can hold a `&dyn ForwardApi` without knowing the
/// concrete type, and `Send + Sync` so one client can serve a whole task
/// invocation regardless of where it is constructed.
pub trait ForwardApi: Send + Sync {
    /// All networks visible to the authenticated user.
    fn list_networks(&self) -> Result<Vec<Network>, ApiError>;

    /// All snapshots of a network, in server order (not trusted).
    fn list_snapshots(&self, network_id: i64) -> Result<Vec<Snapshot>, ApiError>;

    /// Ask the server to start a collection, optionally restricted to the
    /// given device names. `Ok(false)` means the server reported it could
    /// not begin (e.g. a collection is already running).
    fn start_collection(
        &self,
        network_id: i64,
        devices: Option<&[String]>,
    ) -> Result<bool, ApiError>;

    /// Whether a collection is currently running for the network.
    fn collection_in_progress(&self, network_id: i64) -> Result<bool, ApiError>;

    /// Upload a pre-built snapshot artifact. Returns the new snapshot id,
    /// or `None` when the server accepted the request but allocated none.
    fn upload_snapshot(
        &self,
        network_id: i64,
        name: &str,
        path: &Path,
    ) -> Result<Option<i64>, ApiError>;

    /// All checks attached to a snapshot.
    fn list_checks(&self, snapshot_id: i64) -> Result<Vec<CheckRecord>, ApiError>;

    /// Fetch one check by id. A missing check is `Ok(None)`, not an error.
    fn get_check(&self, snapshot_id: i64, check_id: i64) -> Result<Option<CheckRecord>, ApiError>;

    /// Create a check from a raw definition, returning the stored record.
    fn create_check(&self, snapshot_id: i64, definition: &Value) -> Result<CheckRecord, ApiError>;

    /// Delete a check. Deleting a check that does not exist succeeds
    /// (remove is idempotent at this boundary).
    fn delete_check(&self, snapshot_id: i64, check_id: i64) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
