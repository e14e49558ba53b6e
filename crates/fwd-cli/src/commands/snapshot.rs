//! `fwd snapshot` — keep the network's latest snapshot within a
//! freshness budget.

use super::{resolve_network_id, ConnectionArgs};
use crate::report::TaskReport;
use anyhow::Result;
use fwd_snapshot::{ensure_fresh, parse_freshness, RefreshMode, RefreshOutcome, SystemClock};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Maximum tolerated age of the latest snapshot, e.g. 10m, 2h, 1h30m.
    /// Absent means always refresh.
    #[arg(long)]
    pub freshness: Option<String>,

    /// collect | mock
    #[arg(long, default_value = "collect")]
    pub mode: String,

    /// Restrict a live collection to these devices (repeatable).
    #[arg(long = "device")]
    pub devices: Vec<String>,

    /// Artifact name for mock mode.
    #[arg(long)]
    pub mock_name: Option<String>,

    /// Artifact file path for mock mode.
    #[arg(long)]
    pub mock_path: Option<PathBuf>,

    /// Give up polling after this many seconds; absent polls until the
    /// collection completes.
    #[arg(long)]
    pub wait_time: Option<u64>,
}

fn parse_mode(args: &SnapshotArgs) -> std::result::Result<RefreshMode, String> {
    match args.mode.to_ascii_lowercase().as_str() {
        "collect" => Ok(RefreshMode::Collect {
            devices: if args.devices.is_empty() {
                None
            } else {
                Some(args.devices.clone())
            },
        }),
        "mock" => {
            let name = match &args.mock_name {
                Some(name) => name.clone(),
                None => return Err("'mock_name' is required in mock mode".to_string()),
            };
            let path = match &args.mock_path {
                Some(path) => path.clone(),
                None => return Err("'mock_path' is required in mock mode".to_string()),
            };
            Ok(RefreshMode::Mock { name, path })
        }
        other => Err(format!(
            "mode '{other}' is not supported. expected one of: collect | mock"
        )),
    }
}

pub fn run(args: SnapshotArgs) -> Result<TaskReport> {
    // Every validation runs before any network call.
    let mode = match parse_mode(&args) {
        Ok(mode) => mode,
        Err(msg) => return Ok(TaskReport::validation(msg)),
    };

    let budget_secs = match &args.freshness {
        Some(freshness) => match parse_freshness(freshness) {
            Ok(secs) => secs,
            Err(err) => return Ok(TaskReport::validation(err.to_string())),
        },
        None => 0,
    };

    let cfg = args.conn.resolve()?;
    let network_name = match &cfg.network_name {
        Some(name) => name.clone(),
        None => {
            return Ok(TaskReport::validation(
                "'network_name' is required to manage snapshots",
            ))
        }
    };

    let api = args.conn.connect(&cfg)?;
    let network_id = match resolve_network_id(&api, &network_name)? {
        Ok(id) => id,
        Err(report) => return Ok(report),
    };

    let outcome = ensure_fresh(
        &api,
        &SystemClock,
        &cfg.url,
        network_id,
        budget_secs,
        &mode,
        args.wait_time,
    )?;

    Ok(match outcome {
        RefreshOutcome::Fresh { snapshot_id, link } => {
            info!(snapshot_id, "latest snapshot is within budget");
            TaskReport::ok(
                false,
                json!({ "snapshot_id": snapshot_id, "snapshot_link": link }),
            )
        }
        RefreshOutcome::Refreshed { snapshot_id, link } => {
            info!(snapshot_id, "acquired a new snapshot");
            TaskReport::ok(
                true,
                json!({ "snapshot_id": snapshot_id, "snapshot_link": link }),
            )
        }
        RefreshOutcome::Failed(failure) => TaskReport::failure(failure.reason(), failure.to_string()),
    })
}
