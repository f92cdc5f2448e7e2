//! Clap derive structures for the `netlab` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// netlab -- drive simulated network devices from the command line
#[derive(Debug, Parser)]
#[command(
    name = "netlab",
    version,
    about = "Dispatch CLI commands against a simulated network topology",
    long_about = "A front end for the netlab training sandbox.\n\n\
        Loads a topology file, resolves each device's vendor dialect\n\
        (Huawei VRP baseline, Cisco IOS), and dispatches command lines\n\
        through the same engine the sandbox uses.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global options ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Topology file (JSON)
    #[arg(long, short = 't', env = "NETLAB_TOPOLOGY", global = true)]
    pub topology: Option<PathBuf>,

    /// Force a vendor dialect instead of inferring it per device
    /// (huawei or cisco)
    #[arg(long, env = "NETLAB_VENDOR", global = true)]
    pub vendor: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored diagnostics
    #[arg(long, global = true)]
    pub no_color: bool,
}

// ── Command tree ────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive session over a topology file
    ///
    /// `connect <device>` switches the session target; every other line
    /// is forwarded to the dispatch engine.
    Run,

    /// Dispatch one or more lines against a device and print the
    /// resulting transcript
    Exec(ExecArgs),

    /// Inspect a topology file
    #[command(subcommand)]
    Topology(TopologyCommand),
}

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Target device id or hostname
    #[arg(long, short = 'd')]
    pub device: String,

    /// Command lines to dispatch, in order
    #[arg(required = true)]
    pub lines: Vec<String>,

    /// Write the mutated topology back to the topology file
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Subcommand)]
pub enum TopologyCommand {
    /// Check devices, ports, and cable endpoints for consistency
    Validate,
    /// Summarize devices and cabling
    Show,
}
