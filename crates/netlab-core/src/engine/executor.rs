// ── Command executor ──
//
// The single entry point: normalize -> dispatch -> validate -> execute
// -> log. One input line produces exactly one dispatch; there is no
// implicit pipelining. Validation failures append only the error line
// and guarantee zero device mutation.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::CommandError;
use crate::model::{NetworkDevice, Topology};

use super::command::CommandContext;
use super::profile::{Vendor, VendorProfile};
use super::registry::{CommandRegistry, Lookup};

/// Telemetry record emitted per successful dispatch, consumed by the
/// external scoring collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub command: String,
    pub at: DateTime<Utc>,
}

/// Result of dispatching one input line.
#[derive(Debug)]
pub struct Dispatch {
    /// Output lines appended to the device console (error line included).
    pub output: Vec<String>,
    /// Present only when a command executed successfully.
    pub usage: Option<UsageRecord>,
    pub error: Option<CommandError>,
}

impl Dispatch {
    fn empty() -> Self {
        Self {
            output: Vec::new(),
            usage: None,
            error: None,
        }
    }

    fn failed(line: String, error: CommandError) -> Self {
        Self {
            output: vec![line],
            usage: None,
            error: Some(error),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Orchestrates one command at a time against one device. The registry
/// is injected so independent simulations never share mutable state.
#[derive(Debug)]
pub struct CommandExecutor {
    registry: CommandRegistry,
    vendor_override: Option<Vendor>,
}

impl CommandExecutor {
    pub fn new(registry: CommandRegistry) -> Self {
        Self {
            registry,
            vendor_override: None,
        }
    }

    /// Force a dialect instead of inferring it from the device.
    pub fn with_vendor(mut self, vendor: Vendor) -> Self {
        self.vendor_override = Some(vendor);
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Dispatch one raw input line against `device`. `topology` is a
    /// read-only snapshot used for cross-device reads; only `device`
    /// is ever mutated.
    pub fn dispatch(
        &self,
        raw: &str,
        device: &mut NetworkDevice,
        topology: &Topology,
    ) -> Dispatch {
        let profile = VendorProfile::resolve(self.vendor_override, device);
        let echo = format!("{}{}", profile.prompt(device), raw.trim());
        device.console.push(echo);

        let input = profile.normalize(raw, topology);
        if input.tokens.is_empty() {
            return Dispatch::empty();
        }

        let resolved = {
            let ctx = CommandContext {
                device,
                input: &input,
            };
            match self.registry.find(&ctx) {
                Lookup::Found(descriptor) => (descriptor.validate)(&ctx).map(|()| descriptor),
                Lookup::WrongView { name, required } => {
                    debug!(command = name, %required, "rejected: wrong view");
                    Err(CommandError::WrongView {
                        required,
                        actual: ctx.view_kind(),
                    })
                }
                Lookup::NotFound => {
                    warn!(device = %device.id, line = %input.line, "unrecognized command");
                    Err(CommandError::UnknownCommand {
                        line: input.line.clone(),
                    })
                }
            }
        };

        let descriptor = match resolved {
            Ok(descriptor) => descriptor,
            Err(error) => {
                let rendered = profile.render_error(&error);
                device.console.push(rendered.clone());
                return Dispatch::failed(rendered, error);
            }
        };

        match (descriptor.execute)(device, &input) {
            Ok(output) => {
                device.console.extend(output.iter().cloned());
                debug!(device = %device.id, command = descriptor.name, "executed");
                Dispatch {
                    output,
                    usage: Some(UsageRecord {
                        command: descriptor.name.to_owned(),
                        at: Utc::now(),
                    }),
                    error: None,
                }
            }
            Err(error) => {
                let rendered = profile.render_error(&error);
                device.console.push(rendered.clone());
                debug!(device = %device.id, command = descriptor.name, %error, "execution error");
                Dispatch::failed(rendered, error)
            }
        }
    }
}
