//! `fwd network` — list networks matching a name keyword.

use super::ConnectionArgs;
use crate::report::TaskReport;
use anyhow::Result;
use fwd_api::search_networks;
use serde_json::json;

#[derive(clap::Args, Debug)]
pub struct NetworkArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Substring to match against network names; empty matches all.
    #[arg(long, default_value = "")]
    pub keyword: String,
}

pub fn run(args: NetworkArgs) -> Result<TaskReport> {
    let cfg = args.conn.resolve()?;
    let api = args.conn.connect(&cfg)?;

    let matches = search_networks(&api, &args.keyword)?;
    Ok(TaskReport::ok(false, json!({ "networks": matches })))
}
