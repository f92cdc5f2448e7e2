//! Layered configuration: config file, environment, CLI flags.
//!
//! Precedence (lowest to highest): `config.toml` in the platform config
//! directory, `NETLAB_*` environment variables, command-line flags.

use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::GlobalOpts;
use crate::error::CliError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default topology file when --topology is not given.
    #[serde(default)]
    pub topology: Option<PathBuf>,
    /// Default vendor dialect override.
    #[serde(default)]
    pub vendor: Option<String>,
}

/// Platform config file path, e.g. `~/.config/netlab/config.toml`.
pub fn config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "netlab")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("netlab.toml"))
}

/// Resolve the effective configuration for this invocation.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("NETLAB_"))
        .extract()
        .map_err(Box::new)?;

    if let Some(path) = &global.topology {
        config.topology = Some(path.clone());
    }
    if let Some(vendor) = &global.vendor {
        config.vendor = Some(vendor.clone());
    }
    Ok(config)
}
