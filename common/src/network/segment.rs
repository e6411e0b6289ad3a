//! # Network Segment Model
//!
//! A logical network an experiment is attached to. The core only uses it as a
//! predicate against a host's interfaces.

use std::collections::BTreeSet;
use std::net::IpAddr;

use pnet::ipnetwork::IpNetwork;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Network {
    pub name: String,
    pub cidr: IpNetwork,
    pub roles: BTreeSet<String>,
}

impl Network {
    pub fn new(name: impl Into<String>, cidr: IpNetwork) -> Self {
        Self {
            name: name.into(),
            cidr,
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        self.cidr.contains(addr)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
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
