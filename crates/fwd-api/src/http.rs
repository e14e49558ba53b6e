//! Blocking HTTP implementation of [`ForwardApi`].
//!
//! One client per task invocation; every call is a single synchronous
//! round-trip with HTTP basic auth. Lab servers frequently run self-signed
//! certificates, so TLS verification can be switched off explicitly.

use crate::{ApiError, CheckRecord, ForwardApi, Network, Snapshot};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Live HTTP client for the verification server.
pub struct HttpForwardApi {
    base_url: String,
    username: String,
    password: String,
    http: reqwest::blocking::Client,
}

impl HttpForwardApi {
    /// Build a client for `base_url` (scheme + host + port, no trailing
    /// slash required). Credentials are sent as HTTP basic auth on every
    /// request; they are never logged.
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        accept_invalid_certs: bool,
    ) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Config(format!("http client build failed: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            http,
        })
    }

    /// The server base URL (used by callers to build UI deep-links).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .get(self.url(path))
            .basic_auth(&self.username, Some(&self.password))
    }

    fn post(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .post(self.url(path))
            .basic_auth(&self.username, Some(&self.password))
    }

    fn delete(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .delete(self.url(path))
            .basic_auth(&self.username, Some(&self.password))
    }
}

fn send(req: reqwest::blocking::RequestBuilder) -> Result<reqwest::blocking::Response, ApiError> {
    req.send()
        .map_err(|e| ApiError::Transport(e.to_string()))
}

/// Turn a non-success response into [`ApiError::Api`], carrying whatever
/// body text the server produced.
fn fail_status(resp: reqwest::blocking::Response) -> ApiError {
    let status = resp.status().as_u16();
    let message = resp.text().unwrap_or_default();
    ApiError::Api { status, message }
}

fn decode<T: serde::de::DeserializeOwned>(
    resp: reqwest::blocking::Response,
    what: &str,
) -> Result<T, ApiError> {
    resp.json::<T>()
        .map_err(|e| ApiError::Decode(format!("{what}: {e}")))
}

#[derive(Debug, Deserialize)]
struct SnapshotListResponse {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct CollectionStatusResponse {
    busy: bool,
}

#[derive(Debug, Deserialize)]
struct UploadSnapshotResponse {
    #[serde(default)]
    id: Option<i64>,
}

impl ForwardApi for HttpForwardApi {
    fn list_networks(&self) -> Result<Vec<Network>, ApiError> {
        let resp = send(self.get("/api/networks"))?;
        if !resp.status().is_success() {
            return Err(fail_status(resp));
        }
        decode(resp, "network list")
    }

    fn list_snapshots(&self, network_id: i64) -> Result<Vec<Snapshot>, ApiError> {
        let resp = send(self.get(&format!("/api/networks/{network_id}/snapshots")))?;
        if !resp.status().is_success() {
            return Err(fail_status(resp));
        }
        let body: SnapshotListResponse = decode(resp, "snapshot list")?;
        Ok(body.snapshots)
    }

    fn start_collection(
        &self,
        network_id: i64,
        devices: Option<&[String]>,
    ) -> Result<bool, ApiError> {
        let mut req = self.post(&format!("/api/networks/{network_id}/startcollection"));
        if let Some(devices) = devices {
            req = req.json(&serde_json::json!({ "devices": devices }));
        }
        let resp = send(req)?;
        // 409 is the server's "a collection could not begin" answer; the
        // caller reports it as a structured failure, not a fault.
        if resp.status().as_u16() == 409 {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(fail_status(resp));
        }
        Ok(true)
    }

    fn collection_in_progress(&self, network_id: i64) -> Result<bool, ApiError> {
        let resp = send(self.get(&format!("/api/networks/{network_id}/collection/status")))?;
        if !resp.status().is_success() {
            return Err(fail_status(resp));
        }
        let body: CollectionStatusResponse = decode(resp, "collection status")?;
        Ok(body.busy)
    }

    fn upload_snapshot(
        &self,
        network_id: i64,
        name: &str,
        path: &Path,
    ) -> Result<Option<i64>, ApiError> {
        let bytes = std::fs::read(path).map_err(|e| {
            ApiError::Config(format!("snapshot artifact '{}' unreadable: {e}", path.display()))
        })?;

        let resp = send(
            self.post(&format!("/api/networks/{network_id}/snapshots"))
                .query(&[("name", name)])
                .body(bytes),
        )?;
        if !resp.status().is_success() {
            return Err(fail_status(resp));
        }
        let body: UploadSnapshotResponse = decode(resp, "snapshot upload")?;
        Ok(body.id)
    }

    fn list_checks(&self, snapshot_id: i64) -> Result<Vec<CheckRecord>, ApiError> {
        let resp = send(self.get(&format!("/api/snapshots/{snapshot_id}/checks")))?;
        if !resp.status().is_success() {
            return Err(fail_status(resp));
        }
        decode(resp, "check list")
    }

    fn get_check(&self, snapshot_id: i64, check_id: i64) -> Result<Option<CheckRecord>, ApiError> {
        let resp = send(self.get(&format!("/api/snapshots/{snapshot_id}/checks/{check_id}")))?;
        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(fail_status(resp));
        }
        decode::<CheckRecord>(resp, "check fetch").map(Some)
    }

    fn create_check(&self, snapshot_id: i64, definition: &Value) -> Result<CheckRecord, ApiError> {
        let resp = send(
            self.post(&format!("/api/snapshots/{snapshot_id}/checks"))
                .json(definition),
        )?;
        if !resp.status().is_success() {
            return Err(fail_status(resp));
        }
        decode(resp, "check create")
    }

    fn delete_check(&self, snapshot_id: i64, check_id: i64) -> Result<(), ApiError> {
        let resp = send(self.delete(&format!("/api/snapshots/{snapshot_id}/checks/{check_id}")))?;
        // A check that is already gone is a successful removal.
        if resp.status().as_u16() == 404 {
            return Ok(());
        }
        if !resp.status().is_success() {
            return Err(fail_status(resp));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests (mock server, no real network)
// ---------------------------------------------------------------------------
