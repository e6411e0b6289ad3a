//! # fleetcap core
//!
//! Long-lived background tasks on a fleet of remote hosts, with a uniform
//! `deploy` / `backup` / `destroy` lifecycle.
//!
//! * **[`service`]**: the lifecycle contract every background service implements.
//! * **[`capture`]**: the network capture service (one tcpdump per host and interface).
//! * **[`scope`]**: guaranteed cleanup around a block of experiment code.
//! * **[`tmux`]**: detached, named sessions on the remote side.
//! * **[`remote`]**: executor adapters (shell fan-out, recorder).

pub mod capture;
pub mod remote;
pub mod scope;
pub mod service;
pub mod tmux;
