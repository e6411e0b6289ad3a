use pnet::ipnetwork::IpNetwork;

use crate::network::segment::Network;

/// A network card of a remote host, as reported by network discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInterface {
    pub name: String,
    /// Name of the network this card was attached to, when discovery knows it.
    pub network: Option<String>,
    pub addresses: Vec<IpNetwork>,
}

impl HostInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            network: None,
            addresses: Vec::new(),
        }
    }

    pub fn on_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn with_address(mut self, address: IpNetwork) -> Self {
        self.addresses.push(address);
        self
    }

    /// Whether this card is attached to `network`.
    ///
    /// An explicit network name wins. Without one, the card belongs to every
    /// network containing one of its addresses.
    pub fn belongs_to(&self, network: &Network) -> bool {
        match &self.network {
            Some(name) => *name == network.name,
            None => self
                .addresses
                .iter()
                .any(|addr| network.contains(addr.ip())),
        }
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
