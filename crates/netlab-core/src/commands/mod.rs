// ── Command vocabulary ──
//
// Installation order is the shadowing order the registry searches in:
// view navigation and system configuration first, then scoped
// configuration families, then the read-only display and diagnostic
// commands. Within a module, more specific forms register before the
// prefixes they would otherwise be swallowed by.

mod acl_cmd;
mod bgp;
mod diag;
mod display;
mod interface;
mod pool;
mod system;
mod util;

use crate::engine::registry::CommandRegistry;

/// Install the built-in vocabulary into a registry.
pub(crate) fn install(registry: &mut CommandRegistry) {
    system::install(registry);
    interface::install(registry);
    acl_cmd::install(registry);
    bgp::install(registry);
    pool::install(registry);
    display::install(registry);
    diag::install(registry);
}
