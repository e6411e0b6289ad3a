//! # Executor Adapters
//!
//! Concrete implementations of the
//! [`RemoteExecutor`](fleetcap_common::executor::RemoteExecutor) port.
//!
//! * **[`shell`]**: runs plays for real through the system `ssh`/`scp` binaries
//!   (or `sh` for hosts marked `connection: local`), one concurrent dispatch per host.
//! * **[`recorder`]**: records what would have been run. Used for dry runs and tests.
//!
//! Both turn directives into concrete [`render::Step`]s the same way.

pub mod recorder;
pub mod render;
pub mod shell;

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("failed to spawn {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("host unreachable: {0}")]
    Unreachable(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("exited with status {code}: {stderr}")]
    Exit { code: i32, stderr: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
