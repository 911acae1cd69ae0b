//! Machine registry for host discovery.
//!
//! Each machine self-registers via [`inventory::submit!`] with a
//! [`MachineEntry`] containing its CLI name, a one-line description, and a
//! factory function. Hosts discover available machines at runtime without
//! a central list.

use filament_core::core::machine::Machine;

/// Describes a hostable machine.
pub struct MachineEntry {
    /// CLI name used to select this machine (e.g., "trs80").
    pub name: &'static str,
    /// One-line description for listings.
    pub description: &'static str,
    /// Factory: construct the machine in its power-on state.
    pub create: fn() -> Box<dyn Machine>,
}

impl MachineEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        create: fn() -> Box<dyn Machine>,
    ) -> Self {
        Self {
            name,
            description,
            create,
        }
    }
}

inventory::collect!(MachineEntry);

/// Return all registered machines, sorted by name.
pub fn all() -> Vec<&'static MachineEntry> {
    let mut entries: Vec<_> = inventory::iter::<MachineEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a machine by its CLI name.
pub fn find(name: &str) -> Option<&'static MachineEntry> {
    inventory::iter::<MachineEntry>
        .into_iter()
        .find(|e| e.name == name)
}
