//! # Inventory
//!
//! Loads the hosts and networks of an experiment from a YAML document.
//! This is what a provider plus network discovery would hand over to the core:
//! addresses, connection metadata and the interfaces of each host.
//!
//! ```yaml
//! networks:
//!   - name: n1
//!     cidr: 10.0.0.0/24
//!     roles: [experiment]
//! hosts:
//!   - address: 10.0.0.5
//!     alias: h1
//!     user: root
//!     interfaces:
//!       - name: eth0
//!         network: n1
//!         addresses: [10.0.0.5/24]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use pnet::ipnetwork::IpNetwork;
use serde::Deserialize;

use crate::error::InventoryError;
use crate::network::{Host, HostInterface, Network};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInventory {
    #[serde(default)]
    networks: Vec<RawNetwork>,
    #[serde(default)]
    hosts: Vec<RawHost>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNetwork {
    name: String,
    cidr: String,
    #[serde(default)]
    roles: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHost {
    address: String,
    alias: Option<String>,
    user: Option<String>,
    port: Option<u16>,
    #[serde(default)]
    extra: BTreeMap<String, String>,
    #[serde(default)]
    interfaces: Vec<RawInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInterface {
    name: String,
    network: Option<String>,
    #[serde(default)]
    addresses: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub hosts: Vec<Host>,
    pub networks: Vec<Network>,
}

impl Inventory {
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let content = std::fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, InventoryError> {
        let raw: RawInventory = serde_yaml::from_str(content)?;

        let mut networks: Vec<Network> = Vec::with_capacity(raw.networks.len());
        for net in raw.networks {
            if networks.iter().any(|n| n.name == net.name) {
                return Err(InventoryError::DuplicateNetwork(net.name));
            }
            let cidr: IpNetwork = net.cidr.parse().map_err(|source| InventoryError::InvalidCidr {
                network: net.name.clone(),
                cidr: net.cidr.clone(),
                source,
            })?;
            networks.push(Network {
                name: net.name,
                cidr,
                roles: net.roles,
            });
        }

        let mut hosts: Vec<Host> = Vec::with_capacity(raw.hosts.len());
        for raw_host in raw.hosts {
            let host = build_host(raw_host, &networks)?;
            if hosts.iter().any(|h| h.alias == host.alias) {
                return Err(InventoryError::DuplicateAlias(host.alias));
            }
            hosts.push(host);
        }

        Ok(Self { hosts, networks })
    }

    /// Looks networks up by name, in the order given.
    pub fn networks_named<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Network>, InventoryError> {
        names
            .iter()
            .map(|name| {
                self.networks
                    .iter()
                    .find(|n| n.name == name.as_ref())
                    .cloned()
                    .ok_or_else(|| InventoryError::MissingNetwork(name.as_ref().to_string()))
            })
            .collect()
    }

    /// Networks tagged with `role`.
    pub fn networks_with_role(&self, role: &str) -> Vec<Network> {
        self.networks.iter().filter(|n| n.has_role(role)).cloned().collect()
    }
}

fn build_host(raw: RawHost, networks: &[Network]) -> Result<Host, InventoryError> {
    let alias = raw.alias.unwrap_or_else(|| raw.address.clone());

    let mut interfaces: Vec<HostInterface> = Vec::with_capacity(raw.interfaces.len());
    for intf in raw.interfaces {
        if let Some(network) = &intf.network {
            if !networks.iter().any(|n| &n.name == network) {
                return Err(InventoryError::UnknownNetwork {
                    host: alias,
                    interface: intf.name,
                    network: network.clone(),
                });
            }
        }

        let mut addresses: Vec<IpNetwork> = Vec::with_capacity(intf.addresses.len());
        for address in &intf.addresses {
            let parsed = address.parse().map_err(|source| InventoryError::InvalidAddress {
                host: alias.clone(),
                interface: intf.name.clone(),
                address: address.clone(),
                source,
            })?;
            addresses.push(parsed);
        }

        interfaces.push(HostInterface {
            name: intf.name,
            network: intf.network,
            addresses,
        });
    }

    Ok(Host {
        address: raw.address,
        alias,
        user: raw.user,
        port: raw.port,
        extra: raw.extra,
        interfaces,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
