//! fwd — declarative tasks against a network-verification server.
//!
//! This file is intentionally thin: it sets up tracing, parses the
//! command line and prints the task report. All task logic lives in
//! `commands/`.

mod commands;
mod report;

use clap::{Parser, Subcommand};
use report::TaskReport;

#[derive(Parser)]
#[command(name = "fwd")]
#[command(about = "Declarative check/snapshot/network tasks for a verification server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure a reachability check is present, absent, or probe for it
    Check(commands::check::CheckArgs),

    /// Ensure the network's latest snapshot is fresh, collecting or
    /// uploading a new one when it is not
    Snapshot(commands::snapshot::SnapshotArgs),

    /// List networks whose name matches a keyword
    Network(commands::network::NetworkArgs),
}

fn main() {
    // Dev convenience; silent when the file does not exist. Production
    // injects FWD_PASSWORD directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    let report = match run(cli) {
        Ok(report) => report,
        Err(err) => TaskReport::failure("task-error", format!("{err:#}")),
    };

    report.emit();
    if report.failed {
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<TaskReport> {
    match cli.cmd {
        Commands::Check(args) => commands::check::run(args),
        Commands::Snapshot(args) => commands::snapshot::run(args),
        Commands::Network(args) => commands::network::run(args),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
