//! `fwd check` — ensure a reachability check is present/absent, or probe.

use super::{resolve_network_id, ConnectionArgs};
use crate::report::TaskReport;
use anyhow::Result;
use fwd_api::ForwardApi;
use fwd_check::{
    ensure_absent, ensure_present, fetch_check, find_equivalent, AbsentOutcome, CheckError,
    CheckSpec, SourceSelector,
};
use serde_json::json;
use tracing::info;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// present | absent | test
    #[arg(long, default_value = "present")]
    pub state: String,

    /// Snapshot to operate on; defaults to the network's latest.
    #[arg(long)]
    pub snapshot_id: Option<i64>,

    /// Existing check id (required for absent; optional for test, which
    /// otherwise probes by check data).
    #[arg(long)]
    pub check_id: Option<i64>,

    /// Display name for a created check (metadata only).
    #[arg(long)]
    pub name: Option<String>,

    /// Source device name (mutually exclusive with --source-host).
    #[arg(long)]
    pub source: Option<String>,

    /// Source host address (mutually exclusive with --source).
    #[arg(long)]
    pub source_host: Option<String>,

    #[arg(long)]
    pub ipv4_dst: Option<String>,

    #[arg(long)]
    pub ip_proto: Option<String>,

    #[arg(long)]
    pub tp_src: Option<u16>,

    #[arg(long)]
    pub tp_dst: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Present,
    Absent,
    Test,
}

fn parse_state(s: &str) -> std::result::Result<State, String> {
    match s.to_ascii_lowercase().as_str() {
        "present" => Ok(State::Present),
        "absent" => Ok(State::Absent),
        "test" => Ok(State::Test),
        other => Err(format!(
            "state '{other}' is not supported. expected one of: present | absent | test"
        )),
    }
}

pub fn run(args: CheckArgs) -> Result<TaskReport> {
    // Every validation runs before any network call.
    let state = match parse_state(&args.state) {
        Ok(state) => state,
        Err(msg) => return Ok(TaskReport::validation(msg)),
    };

    if state == State::Absent && args.check_id.is_none() {
        return Ok(TaskReport::validation(
            "'check_id' is required to delete a check",
        ));
    }

    let spec = if state != State::Absent && args.check_id.is_none() {
        let source =
            match SourceSelector::from_fields(args.source.clone(), args.source_host.clone()) {
                Ok(source) => source,
                Err(err) => return Ok(TaskReport::validation(err.to_string())),
            };
        let mut spec = CheckSpec::new(source);
        spec.ipv4_dst = args.ipv4_dst.clone();
        spec.ip_proto = args.ip_proto.clone();
        spec.tp_src = args.tp_src;
        spec.tp_dst = args.tp_dst;
        spec.name = args.name.clone();
        Some(spec)
    } else {
        None
    };

    let cfg = args.conn.resolve()?;
    if cfg.network_name.is_none() && args.snapshot_id.is_none() {
        return Ok(TaskReport::validation(
            "either 'network_name' or 'snapshot_id' is mandatory for this task",
        ));
    }

    let api = args.conn.connect(&cfg)?;

    let snapshot_id = match resolve_snapshot(&api, &cfg.network_name, args.snapshot_id)? {
        Ok(id) => id,
        Err(report) => return Ok(report),
    };

    match state {
        State::Test => match args.check_id {
            Some(check_id) => {
                match fetch_check(&api, snapshot_id, check_id).map_err(anyhow::Error::from)? {
                    Some(check) => Ok(TaskReport::ok(
                        false,
                        json!({ "found": true, "check": check }),
                    )),
                    None => Ok(TaskReport::ok_with_msg(
                        false,
                        json!({ "found": false }),
                        format!("check with id {check_id} does not exist"),
                    )),
                }
            }
            // Data-based presence probe: canonical match, never a create.
            None => {
                let spec = spec.expect("built above for test-without-id");
                match find_equivalent(&api, snapshot_id, &spec).map_err(anyhow::Error::from)? {
                    Some(check) => Ok(TaskReport::ok(
                        false,
                        json!({ "found": true, "check": check }),
                    )),
                    None => Ok(TaskReport::ok_with_msg(
                        false,
                        json!({ "found": false }),
                        "no equivalent check exists",
                    )),
                }
            }
        },

        State::Present => {
            if let Some(check_id) = args.check_id {
                // Addressing an existing check by id is a pure probe.
                return match fetch_check(&api, snapshot_id, check_id)
                    .map_err(anyhow::Error::from)?
                {
                    Some(check) => Ok(TaskReport::ok(false, json!({ "check": check }))),
                    None => Ok(TaskReport::ok_with_msg(
                        false,
                        json!({ "found": false }),
                        format!("check with id {check_id} does not exist"),
                    )),
                };
            }

            let spec = spec.expect("built above for present-without-id");
            match ensure_present(&api, snapshot_id, &spec) {
                Ok(outcome) => {
                    if outcome.changed {
                        info!(snapshot_id, "created check");
                    } else {
                        info!(snapshot_id, "matched an existing check");
                    }
                    Ok(TaskReport::ok(outcome.changed, json!({ "check": outcome.check })))
                }
                Err(CheckError::CreateAmbiguous) => Ok(TaskReport::failure(
                    "create-ambiguous",
                    CheckError::CreateAmbiguous.to_string(),
                )),
                Err(CheckError::Api(err)) => Err(err.into()),
            }
        }

        State::Absent => {
            let check_id = args.check_id.expect("validated above");
            match ensure_absent(&api, snapshot_id, check_id).map_err(anyhow::Error::from)? {
                AbsentOutcome::Removed => Ok(TaskReport::ok(true, json!({ "check_id": check_id }))),
                AbsentOutcome::StillPresent => Ok(TaskReport::failure(
                    "delete-incomplete",
                    format!("check {check_id} is still present after deletion"),
                )),
            }
        }
    }
}

/// Use the explicit snapshot id, or the latest snapshot of the named
/// network. Missing network or empty snapshot history are task-level
/// failures, not faults.
fn resolve_snapshot(
    api: &dyn ForwardApi,
    network_name: &Option<String>,
    snapshot_id: Option<i64>,
) -> Result<std::result::Result<i64, TaskReport>> {
    if let Some(id) = snapshot_id {
        return Ok(Ok(id));
    }

    // Presence of the name was validated before connecting.
    let name = network_name.as_deref().expect("network_name checked");
    let network_id = match resolve_network_id(api, name)? {
        Ok(id) => id,
        Err(report) => return Ok(Err(report)),
    };

    let snapshots = api.list_snapshots(network_id)?;
    match fwd_snapshot::latest_snapshot(&snapshots) {
        Some(latest) => Ok(Ok(latest.id)),
        None => Ok(Err(TaskReport::failure(
            "not-found",
            "no snapshots available in the network",
        ))),
    }
}
