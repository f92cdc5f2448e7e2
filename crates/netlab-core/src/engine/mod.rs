// ── Command engine ──
//
// Descriptor-based command abstraction, vendor-partitioned registry,
// dialect profiles, and the dispatch executor.

pub mod command;
pub mod executor;
pub mod profile;
pub mod registry;

pub use command::{
    CommandContext, CommandDescriptor, CommandInput, ExecuteFn, MatchFn, ValidateFn,
    VendorAffinity,
};
pub use executor::{CommandExecutor, Dispatch, UsageRecord};
pub use profile::{Vendor, VendorProfile, CISCO, HUAWEI};
pub use registry::{CommandRegistry, Lookup};
