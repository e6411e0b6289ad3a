//! Executor that records what it is asked to run instead of running it.
//!
//! Follows the same contract as the real executors (task order, per-host skip
//! after a fatal failure), so the plans it records are the ones a real run would
//! dispatch. Failures can be scripted per host and task.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use fleetcap_common::directive::Play;
use fleetcap_common::executor::{PlayReport, RemoteExecutor, TaskResult, TaskStatus};
use fleetcap_common::network::Host;

use super::render::{self, Step};

/// Steps dispatched to one host for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub play: String,
    pub task: String,
    pub host: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTask {
    pub name: String,
    pub kind: &'static str,
    pub ignore_errors: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPlay {
    pub name: String,
    pub hosts: Vec<String>,
    pub tasks: Vec<RecordedTask>,
}

#[derive(Default)]
struct Journal {
    plays: Vec<RecordedPlay>,
    dispatches: Vec<Dispatch>,
}

#[derive(Default)]
pub struct RecordingExecutor {
    journal: Mutex<Journal>,
    /// (host alias, task name) pairs reported as failed.
    failing: Vec<(String, String)>,
    unreachable: Vec<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `task` as failed on `host`.
    pub fn fail(mut self, host: &str, task: &str) -> Self {
        self.failing.push((host.to_string(), task.to_string()));
        self
    }

    /// Reports every task as unreachable on `host`.
    pub fn unreachable(mut self, host: &str) -> Self {
        self.unreachable.push(host.to_string());
        self
    }

    pub fn plays(&self) -> Vec<RecordedPlay> {
        self.journal().plays.clone()
    }

    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.journal().dispatches.clone()
    }

    pub fn clear(&self) {
        let mut journal = self.journal();
        journal.plays.clear();
        journal.dispatches.clear();
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        // A panicking test must not hide the journal from the others.
        self.journal.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn status_of(&self, host: &str, task: &str) -> TaskStatus {
        if self.unreachable.iter().any(|h| h == host) {
            return TaskStatus::Unreachable("scripted".to_string());
        }
        if self.failing.iter().any(|(h, t)| h == host && t == task) {
            return TaskStatus::Failed("scripted".to_string());
        }
        TaskStatus::Ok
    }
}

#[async_trait]
impl RemoteExecutor for RecordingExecutor {
    async fn run(&self, hosts: &[&Host], play: &Play) -> anyhow::Result<PlayReport> {
        let mut journal = self.journal();
        journal.plays.push(RecordedPlay {
            name: play.name.clone(),
            hosts: hosts.iter().map(|h| h.alias.clone()).collect(),
            tasks: play
                .tasks
                .iter()
                .map(|t| RecordedTask {
                    name: t.name.clone(),
                    kind: t.directive.kind(),
                    ignore_errors: t.ignore_errors,
                })
                .collect(),
        });

        let mut report = PlayReport::new();
        let mut dead: Vec<&str> = Vec::new();
        for task in &play.tasks {
            for host in hosts {
                let status = if dead.contains(&host.alias.as_str()) {
                    TaskStatus::Skipped
                } else {
                    journal.dispatches.push(Dispatch {
                        play: play.name.clone(),
                        task: task.name.clone(),
                        host: host.alias.clone(),
                        steps: render::render(&task.directive, host),
                    });
                    let status = self.status_of(&host.alias, &task.name);
                    if !status.is_ok() && !task.ignore_errors {
                        dead.push(&host.alias);
                    }
                    status
                };
                report.push(TaskResult {
                    play: play.name.clone(),
                    task: task.name.clone(),
                    host: host.alias.clone(),
                    status,
                    ignored: task.ignore_errors,
                });
            }
        }
        Ok(report)
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
