//! Topology loading and the interactive / one-shot dispatch loops.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use netlab_core::engine::{CommandExecutor, CommandRegistry, Vendor, VendorProfile};
use netlab_core::model::{NetworkDevice, Topology};

use crate::config::Config;
use crate::error::CliError;

// ── Topology persistence ────────────────────────────────────────────

pub fn topology_path(config: &Config) -> Result<PathBuf, CliError> {
    config.topology.clone().ok_or(CliError::NoTopology)
}

pub fn load_topology(path: &Path) -> Result<Topology, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::TopologyRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::TopologyParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_topology(path: &Path, topology: &Topology) -> Result<(), CliError> {
    let raw = serde_json::to_string_pretty(topology).map_err(|source| CliError::TopologyParse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, raw).map_err(|source| CliError::TopologyWrite {
        path: path.to_path_buf(),
        source,
    })
}

// ── Session ─────────────────────────────────────────────────────────

/// Owns the mutable topology and dispatches lines against one device
/// at a time. The engine sees a cloned snapshot per dispatch, so
/// cross-device reads stay consistent while only the target mutates.
pub struct Session {
    topology: Topology,
    executor: CommandExecutor,
    vendor_override: Option<Vendor>,
}

impl Session {
    pub fn new(topology: Topology, config: &Config) -> Result<Self, CliError> {
        let mut executor = CommandExecutor::new(CommandRegistry::with_builtins());
        let mut vendor_override = None;
        if let Some(raw) = &config.vendor {
            let vendor = Vendor::from_str(raw).map_err(|_| CliError::Validation {
                field: "vendor".into(),
                reason: format!("expected 'huawei' or 'cisco', got '{raw}'"),
            })?;
            executor = executor.with_vendor(vendor);
            vendor_override = Some(vendor);
        }
        Ok(Self {
            topology,
            executor,
            vendor_override,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    fn device_index(&self, identifier: &str) -> Option<usize> {
        self.topology.devices.iter().position(|d| {
            d.id.as_str().eq_ignore_ascii_case(identifier)
                || d.hostname.eq_ignore_ascii_case(identifier)
        })
    }

    fn prompt_for(&self, device: &NetworkDevice) -> String {
        VendorProfile::resolve(self.vendor_override, device).prompt(device)
    }

    /// Dispatch one line against the named device, printing the echoed
    /// line and its output.
    pub fn dispatch(
        &mut self,
        identifier: &str,
        line: &str,
        out: &mut impl Write,
    ) -> Result<bool, CliError> {
        let index = self
            .device_index(identifier)
            .ok_or_else(|| CliError::UnknownDevice {
                identifier: identifier.to_owned(),
            })?;
        let snapshot = self.topology.clone();
        let prompt = self.prompt_for(&snapshot.devices[index]);
        writeln!(out, "{prompt}{}", line.trim())?;

        let device = &mut self.topology.devices[index];
        let dispatch = self.executor.dispatch(line, device, &snapshot);
        for text in &dispatch.output {
            writeln!(out, "{text}")?;
        }
        if let Some(usage) = &dispatch.usage {
            debug!(command = %usage.command, device = identifier, "usage record");
        }
        Ok(dispatch.succeeded())
    }

    /// One-shot mode: dispatch each line in order against one device.
    pub fn exec(
        &mut self,
        identifier: &str,
        lines: &[String],
        out: &mut impl Write,
    ) -> Result<(), CliError> {
        for line in lines {
            self.dispatch(identifier, line, out)?;
        }
        Ok(())
    }

    /// Interactive loop over stdin. `connect <device>` switches the
    /// session target; `exit` with no target device leaves the loop.
    pub fn repl(&mut self, input: &mut impl BufRead, out: &mut impl Write) -> Result<(), CliError> {
        writeln!(out, "netlab interactive session. connect <device> to begin.")?;
        let mut target: Option<String> = None;

        let mut buffer = String::new();
        loop {
            if let Some(identifier) = &target {
                if let Some(index) = self.device_index(identifier) {
                    let device = &self.topology.devices[index];
                    write!(out, "{}", self.prompt_for(device))?;
                }
            } else {
                write!(out, "netlab> ")?;
            }
            out.flush()?;

            buffer.clear();
            if input.read_line(&mut buffer)? == 0 {
                return Ok(());
            }
            let line = buffer.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(identifier) = line.strip_prefix("connect ") {
                let identifier = identifier.trim();
                if self.device_index(identifier).is_none() {
                    writeln!(out, "no such device: {identifier}")?;
                } else {
                    info!(device = identifier, "session target switched");
                    target = Some(identifier.to_owned());
                }
                continue;
            }
            if target.is_none() && (line == "exit" || line == "quit") {
                return Ok(());
            }

            match &target {
                Some(identifier) => {
                    let identifier = identifier.clone();
                    // The echo is already in the dispatch transcript;
                    // print output only.
                    let index = self
                        .device_index(&identifier)
                        .ok_or_else(|| CliError::UnknownDevice {
                            identifier: identifier.clone(),
                        })?;
                    let snapshot = self.topology.clone();
                    let device = &mut self.topology.devices[index];
                    let dispatch = self.executor.dispatch(line, device, &snapshot);
                    for text in &dispatch.output {
                        writeln!(out, "{text}")?;
                    }
                }
                None => writeln!(out, "not connected; use connect <device>")?,
            }
        }
    }
}

// ── Topology inspection ─────────────────────────────────────────────

/// Consistency findings for `topology validate`.
pub fn validate(topology: &Topology) -> Vec<String> {
    let mut findings = Vec::new();
    for (i, device) in topology.devices.iter().enumerate() {
        if topology.devices[..i].iter().any(|d| d.id == device.id) {
            findings.push(format!("duplicate device id: {}", device.id));
        }
    }
    for cable in &topology.cables {
        for end in [&cable.a, &cable.b] {
            match topology.device(&end.device) {
                None => findings.push(format!("cable references unknown device: {}", end.device)),
                Some(device) if device.port(&end.port).is_none() => findings.push(format!(
                    "cable references unknown port {} on {}",
                    end.port, end.device
                )),
                Some(_) => {}
            }
        }
    }
    findings
}

pub fn summarize(topology: &Topology, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(
        out,
        "{} device(s), {} cable(s)",
        topology.devices.len(),
        topology.cables.len()
    )?;
    for device in &topology.devices {
        writeln!(
            out,
            "  {}  hostname={}  vendor={}  ports={}",
            device.id,
            device.hostname,
            device.vendor,
            device.ports.len()
        )?;
    }
    for cable in &topology.cables {
        writeln!(
            out,
            "  {}:{} <-> {}:{}",
            cable.a.device, cable.a.port, cable.b.device, cable.b.port
        )?;
    }
    Ok(())
}
