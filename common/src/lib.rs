//! # fleetcap common
//!
//! Domain models and ports shared by every other crate of the workspace.
//!
//! * **[`network`]**: host and network descriptors, role grouping.
//! * **[`directive`]**: the remote work vocabulary (plays, tasks, directives).
//! * **[`executor`]**: the outbound port that runs a play against a host group.
//! * **[`inventory`]**: loads hosts and networks from a YAML description.
//!
//! Nothing in here opens a connection or spawns a process.

pub mod config;
pub mod directive;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod log;
pub mod network;
