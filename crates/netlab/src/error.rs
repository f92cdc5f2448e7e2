//! CLI error types with miette diagnostics.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes: 0 success, 1 usage/config error, 2 topology load error.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const USAGE: i32 = 1;
    pub const TOPOLOGY: i32 = 2;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("no topology file given")]
    #[diagnostic(
        code(netlab::no_topology),
        help("Pass --topology <file>, set NETLAB_TOPOLOGY, or add `topology = \"...\"` to the config file.")
    )]
    NoTopology,

    #[error("could not read topology file {path}")]
    #[diagnostic(
        code(netlab::topology_read),
        help("Check that the file exists and is readable.")
    )]
    TopologyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("topology file {path} is not valid")]
    #[diagnostic(
        code(netlab::topology_parse),
        help("The file must be the JSON produced by `netlab exec --save` or the topology editor.")
    )]
    TopologyParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not write topology file {path}")]
    #[diagnostic(code(netlab::topology_write))]
    TopologyWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("device '{identifier}' not found in the topology")]
    #[diagnostic(
        code(netlab::unknown_device),
        help("Run `netlab topology show` to list device ids and hostnames.")
    )]
    UnknownDevice { identifier: String },

    #[error("invalid value for {field}: {reason}")]
    #[diagnostic(code(netlab::validation))]
    Validation { field: String, reason: String },

    #[error("config file error")]
    #[diagnostic(code(netlab::config))]
    Config(#[from] Box<figment::Error>),

    #[error(transparent)]
    #[diagnostic(code(netlab::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TopologyRead { .. }
            | Self::TopologyParse { .. }
            | Self::TopologyWrite { .. } => exit_code::TOPOLOGY,
            _ => exit_code::USAGE,
        }
    }
}
