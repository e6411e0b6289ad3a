//! # Remote Executor Port
//!
//! The contract between the services and whatever actually reaches the hosts.
//!
//! ## Contract
//! * Tasks run in play order.
//! * A single task is dispatched to every live host concurrently. One slow or
//!   unreachable host must not stall the others.
//! * A host failing a task that does not `ignore_errors` is skipped for the
//!   rest of the play. Other hosts are unaffected.
//! * Per-host failures are reported in the [`PlayReport`], never as `Err`.
//!   `Err` means the play could not be run at all.

use std::fmt;

use async_trait::async_trait;

use crate::directive::Play;
use crate::network::host::Host;

#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn run(&self, hosts: &[&Host], play: &Play) -> anyhow::Result<PlayReport>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Ok,
    Failed(String),
    Unreachable(String),
    /// Not attempted because an earlier task of the play failed on this host.
    Skipped,
}

impl TaskStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, TaskStatus::Ok)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Ok => f.write_str("ok"),
            TaskStatus::Failed(reason) => write!(f, "failed: {reason}"),
            TaskStatus::Unreachable(reason) => write!(f, "unreachable: {reason}"),
            TaskStatus::Skipped => f.write_str("skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub play: String,
    pub task: String,
    pub host: String,
    pub status: TaskStatus,
    /// Whether the failure of this task was tolerated by the play.
    pub ignored: bool,
}

/// Outcome of one or more plays, one entry per (task, host).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayReport {
    pub results: Vec<TaskResult>,
}

impl PlayReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: TaskResult) {
        self.results.push(result);
    }

    /// Appends the results of a later play.
    pub fn merge(&mut self, other: PlayReport) {
        self.results.extend(other.results);
    }

    /// Every result that is not [`TaskStatus::Ok`].
    pub fn failures(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|r| !r.status.is_ok())
    }

    /// Failures that stopped a host from completing its play.
    pub fn fatal_failures(&self) -> impl Iterator<Item = &TaskResult> {
        self.failures()
            .filter(|r| !r.ignored && !matches!(r.status, TaskStatus::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.fatal_failures().next().is_none()
    }

    /// Aliases of hosts with at least one fatal failure, each once.
    pub fn failed_hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = Vec::new();
        for result in self.fatal_failures() {
            if !hosts.contains(&result.host.as_str()) {
                hosts.push(&result.host);
            }
        }
        hosts
    }

    pub fn for_host<'r>(&'r self, alias: &'r str) -> impl Iterator<Item = &'r TaskResult> + 'r {
        self.results.iter().filter(move |r| r.host == alias)
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
