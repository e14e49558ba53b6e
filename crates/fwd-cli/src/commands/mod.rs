//! Task command handlers and the parameter plumbing they share.

pub mod check;
pub mod network;
pub mod snapshot;

use crate::report::TaskReport;
use anyhow::Result;
use fwd_api::{ForwardApi, HttpForwardApi};
use fwd_config::{ParamOverlay, ResolvedConfig};
use std::path::PathBuf;

/// Connection flags shared by every task.
#[derive(clap::Args, Debug)]
pub struct ConnectionArgs {
    /// Properties file with url/username/password/network_name defaults.
    #[arg(long)]
    pub properties_file: Option<PathBuf>,

    /// Server URL, e.g. https://localhost:8443
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    /// Prefer the FWD_PASSWORD environment variable over this flag.
    #[arg(long)]
    pub password: Option<String>,

    /// Network to operate on (by name).
    #[arg(long)]
    pub network_name: Option<String>,

    /// Skip TLS certificate verification (lab servers with self-signed
    /// certificates).
    #[arg(long, default_value_t = false)]
    pub insecure: bool,
}

impl ConnectionArgs {
    /// Resolve parameter-over-file configuration. The password flag falls
    /// back to `FWD_PASSWORD` so credentials can stay off the command line.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let params = ParamOverlay {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self
                .password
                .clone()
                .or_else(|| std::env::var("FWD_PASSWORD").ok()),
            network_name: self.network_name.clone(),
        };
        fwd_config::load_and_resolve(self.properties_file.as_deref(), &params)
    }

    pub fn connect(&self, cfg: &ResolvedConfig) -> Result<HttpForwardApi> {
        Ok(HttpForwardApi::new(
            &cfg.url,
            &cfg.username,
            &cfg.password,
            self.insecure,
        )?)
    }
}

/// Resolve the network named in the configuration to its id, or produce
/// the task-level failure report when it does not exist.
pub fn resolve_network_id(
    api: &dyn ForwardApi,
    network_name: &str,
) -> Result<std::result::Result<i64, TaskReport>> {
    match fwd_api::find_network_id(api, network_name)? {
        Some(id) => {
            tracing::info!(network = network_name, id, "resolved network");
            Ok(Ok(id))
        }
        None => Ok(Err(TaskReport::failure(
            "not-found",
            format!("no network present with given name '{network_name}'"),
        ))),
    }
}
