//! # Host and Network Descriptors
//!
//! Read-only descriptions of the machines and network segments an experiment runs on.
//! They are produced outside of the core (see [`crate::inventory`]) and only ever read by it.

pub mod host;
pub mod interface;
pub mod roles;
pub mod segment;

pub use host::{Host, HostKey};
pub use interface::HostInterface;
pub use roles::Roles;
pub use segment::Network;
