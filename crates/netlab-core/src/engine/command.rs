// ── Command abstraction ──
//
// Each CLI command is a data record bundling a match predicate, a
// validate function, and an execute function, plus static metadata.
// Insertion order in the registry is the shadowing order; nothing here
// relies on inheritance-style dispatch.

use crate::error::CommandError;
use crate::model::{NetworkDevice, Topology, ViewKind};

use super::profile::Vendor;

/// Normalized input for one dispatch, shared by match/validate/execute.
///
/// `tokens` are lowercased canonical tokens (dialect abbreviations
/// already expanded); `raw_tokens` keep the caller's original casing at
/// the same positions for case-preserving arguments (hostnames, pool
/// names).
#[derive(Debug)]
pub struct CommandInput<'t> {
    pub line: String,
    pub tokens: Vec<String>,
    pub raw_tokens: Vec<String>,
    pub vendor: Vendor,
    pub topology: &'t Topology,
}

impl<'t> CommandInput<'t> {
    pub fn token(&self, i: usize) -> Option<&str> {
        self.tokens.get(i).map(String::as_str)
    }

    pub fn raw_token(&self, i: usize) -> Option<&str> {
        self.raw_tokens.get(i).map(String::as_str)
    }

    /// True when the token stream starts with exactly these words.
    pub fn starts_with(&self, words: &[&str]) -> bool {
        self.tokens.len() >= words.len()
            && self.tokens.iter().zip(words).all(|(t, w)| t == w)
    }

    pub fn head_is(&self, word: &str) -> bool {
        self.token(0) == Some(word)
    }

    /// Tokens after position `n`.
    pub fn args_after(&self, n: usize) -> &[String] {
        self.tokens.get(n..).unwrap_or(&[])
    }
}

/// Read-only dispatch context: the target device plus the normalized
/// input. `validate` only ever sees this, which keeps it pure with
/// respect to device state.
#[derive(Debug)]
pub struct CommandContext<'a, 't> {
    pub device: &'a NetworkDevice,
    pub input: &'a CommandInput<'t>,
}

impl CommandContext<'_, '_> {
    pub fn view_kind(&self) -> ViewKind {
        self.device.cli.view.kind()
    }
}

pub type MatchFn = fn(&CommandContext) -> bool;
pub type ValidateFn = fn(&CommandContext) -> Result<(), CommandError>;
pub type ExecuteFn = fn(&mut NetworkDevice, &CommandInput) -> Result<Vec<String>, CommandError>;

/// Which vendor bucket a command registers into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorAffinity {
    /// Generic bucket, reachable from any dialect.
    Any,
    /// Vendor bucket, searched before the generic one.
    Only(Vendor),
}

/// One command descriptor. `execute` is only ever invoked after a
/// passing `validate`; it mutates the device in place and returns
/// vendor-phrased output lines.
pub struct CommandDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub vendor: VendorAffinity,
    /// Views the command is legal in; empty means any view.
    pub required_views: &'static [ViewKind],
    pub matches: MatchFn,
    pub validate: ValidateFn,
    pub execute: ExecuteFn,
}

impl CommandDescriptor {
    /// A descriptor handles the input when its match predicate fires or
    /// when the token stream starts with one of its alias word
    /// sequences. Aliases cover spellings the predicate does not, such
    /// as the Cisco `no` form of a Huawei `undo` command.
    pub fn can_handle(&self, ctx: &CommandContext) -> bool {
        if (self.matches)(ctx) {
            return true;
        }
        self.aliases.iter().any(|alias| {
            let words: Vec<&str> = alias.split_whitespace().collect();
            !words.is_empty() && ctx.input.starts_with(&words)
        })
    }

    pub fn view_ok(&self, view: ViewKind) -> bool {
        self.required_views.is_empty() || self.required_views.contains(&view)
    }
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("vendor", &self.vendor)
            .field("required_views", &self.required_views)
            .finish_non_exhaustive()
    }
}
