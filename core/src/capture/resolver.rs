//! # Interface Resolver
//!
//! Works out, per host, which network cards belong to the networks a capture
//! was asked to watch. The result lives in an [`InterfaceTable`] owned by the
//! service; hosts are never written to.
//!
//! Resolution relies on the interface metadata the hosts already carry (from
//! network discovery). It never fails: a host without a matching card simply
//! gets an empty list, which is a normal outcome on heterogeneous fleets.

use fleetcap_common::directive::HostItems;
use fleetcap_common::network::{Host, Network};
use tracing::debug;

/// Interface names to capture on, per host.
pub type InterfaceTable = HostItems;

/// Builds the table for `hosts`. Every host gets an entry, empty when `networks` is.
pub fn resolve(hosts: &[&Host], networks: &[Network]) -> InterfaceTable {
    let mut table = InterfaceTable::new();
    for host in hosts {
        let names: Vec<String> = if networks.is_empty() {
            Vec::new()
        } else {
            host.filter_interfaces(networks)
        };
        debug!("{}: capturing on [{}] from networks", host.alias, names.join(", "));
        table.insert(host.key(), names);
    }
    table
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
