// ── Command registry ──
//
// Commands partitioned by vendor plus a generic bucket, each bucket
// preserving registration order. Registration order is a documented
// invariant: more specific commands registered earlier shadow generic
// ones with overlapping match predicates. There is no re-ordering at
// lookup time and no process-wide singleton -- construct a registry
// and inject it into the executor.

use indexmap::IndexMap;

use crate::model::ViewKind;

use super::command::{CommandContext, CommandDescriptor, VendorAffinity};
use super::profile::Vendor;

#[derive(Debug, Default)]
pub struct CommandRegistry {
    buckets: IndexMap<Vendor, Vec<CommandDescriptor>>,
    generic: Vec<CommandDescriptor>,
}

/// Outcome of a registry lookup.
#[derive(Debug)]
pub enum Lookup<'r> {
    Found(&'r CommandDescriptor),
    /// A command matched the tokens but is not legal in the current
    /// view; carries the first such command's requirement.
    WrongView {
        name: &'static str,
        required: ViewKind,
    },
    NotFound,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in vocabulary.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::commands::install(&mut registry);
        registry
    }

    pub fn register(&mut self, descriptor: CommandDescriptor) {
        match descriptor.vendor {
            VendorAffinity::Any => self.generic.push(descriptor),
            VendorAffinity::Only(vendor) => {
                self.buckets.entry(vendor).or_default().push(descriptor);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.generic.len() + self.buckets.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vendor bucket first, then the generic bucket, both in
    /// registration order.
    fn ordered(&self, vendor: Vendor) -> impl Iterator<Item = &CommandDescriptor> {
        self.buckets
            .get(&vendor)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .chain(self.generic.iter())
    }

    /// First-match-wins lookup. A token match in a wrong view keeps
    /// scanning (a later bucket entry may be legal here) and is only
    /// reported if nothing legal matches.
    pub fn find(&self, ctx: &CommandContext) -> Lookup<'_> {
        let view = ctx.view_kind();
        let mut wrong_view: Option<(&'static str, ViewKind)> = None;
        for descriptor in self.ordered(ctx.input.vendor) {
            if !descriptor.can_handle(ctx) {
                continue;
            }
            if descriptor.view_ok(view) {
                return Lookup::Found(descriptor);
            }
            if wrong_view.is_none() {
                if let Some(required) = descriptor.required_views.first() {
                    wrong_view = Some((descriptor.name, *required));
                }
            }
        }
        match wrong_view {
            Some((name, required)) => Lookup::WrongView { name, required },
            None => Lookup::NotFound,
        }
    }
}
