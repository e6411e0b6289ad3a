use std::path::PathBuf;

use pnet::ipnetwork::IpNetworkError;
use thiserror::Error;

/// Reasons an inventory description cannot be turned into hosts and networks.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to read inventory {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed inventory")]
    Parse(#[from] serde_yaml::Error),
    #[error("network '{network}' has an invalid cidr '{cidr}'")]
    InvalidCidr {
        network: String,
        cidr: String,
        #[source]
        source: IpNetworkError,
    },
    #[error("interface '{interface}' of host '{host}' has an invalid address '{address}'")]
    InvalidAddress {
        host: String,
        interface: String,
        address: String,
        #[source]
        source: IpNetworkError,
    },
    #[error("interface '{interface}' of host '{host}' refers to unknown network '{network}'")]
    UnknownNetwork {
        host: String,
        interface: String,
        network: String,
    },
    #[error("network '{0}' is not declared in the inventory")]
    MissingNetwork(String),
    #[error("network '{0}' is declared more than once")]
    DuplicateNetwork(String),
    #[error("host alias '{0}' is used more than once")]
    DuplicateAlias(String),
}
