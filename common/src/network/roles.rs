use std::collections::BTreeMap;

use crate::network::host::Host;

/// Name of the synthetic group used by host-scoped services.
pub const ALL: &str = "all";

/// Hosts grouped by role name. Borrowed from whoever owns the hosts.
#[derive(Debug, Clone, Default)]
pub struct Roles<'a> {
    groups: BTreeMap<String, Vec<&'a Host>>,
}

impl<'a> Roles<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapses `hosts` into the single [`ALL`] group.
    pub fn single(hosts: &'a [Host]) -> Self {
        let mut roles = Self::new();
        for host in hosts {
            roles.add(ALL, host);
        }
        roles
    }

    /// Adds `host` to `role`. A host already present in the role (same alias) is ignored.
    pub fn add(&mut self, role: &str, host: &'a Host) {
        let group = self.groups.entry(role.to_string()).or_default();
        if !group.iter().any(|h| h.alias == host.alias) {
            group.push(host);
        }
    }

    /// Every host of every role, each alias once, in role then insertion order.
    pub fn hosts(&self) -> Vec<&'a Host> {
        let mut all: Vec<&'a Host> = Vec::new();
        for host in self.groups.values().flatten().copied() {
            if !all.iter().any(|h| h.alias == host.alias) {
                all.push(host);
            }
        }
        all
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
