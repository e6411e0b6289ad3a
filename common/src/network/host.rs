use std::collections::BTreeMap;
use std::fmt;

use crate::network::interface::HostInterface;
use crate::network::segment::Network;

/// Identity of a host inside one service instance (its alias).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostKey(String);

impl HostKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostKey {
    fn from(alias: &str) -> Self {
        Self(alias.to_string())
    }
}

/// A remote machine commands can be run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub address: String,
    pub alias: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    /// Free-form connection and provider metadata.
    pub extra: BTreeMap<String, String>,
    pub interfaces: Vec<HostInterface>,
}

impl Host {
    /// Creates a host whose alias is its address.
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            alias: address.clone(),
            address,
            user: None,
            port: None,
            extra: BTreeMap::new(),
            interfaces: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn with_interface(mut self, interface: HostInterface) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn key(&self) -> HostKey {
        HostKey(self.alias.clone())
    }

    /// `user@address` when a user is set, the bare address otherwise.
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.address),
            None => self.address.clone(),
        }
    }

    /// Names of the interfaces attached to one of `networks`, in host order.
    pub fn filter_interfaces(&self, networks: &[Network]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for intf in &self.interfaces {
            if names.contains(&intf.name) {
                continue;
            }
            if networks.iter().any(|net| intf.belongs_to(net)) {
                names.push(intf.name.clone());
            }
        }
        names
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
