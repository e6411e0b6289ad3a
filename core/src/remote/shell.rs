//! # Shell Executor
//!
//! Runs plays for real through the system `ssh` and `scp` binaries.
//!
//! * Tasks run in play order. Within a task every live host is dispatched
//!   concurrently and the task ends when all of them are done.
//! * A host that fails a task not marked `ignore_errors` is skipped for the rest
//!   of the play. Other hosts carry on.
//! * Hosts whose `extra` metadata sets `connection: local` run through `sh -c` on
//!   this machine, and their fetches are plain copies.
//!
//! Per-host failures end up in the [`PlayReport`]; `run` itself only fails when
//! the play cannot be dispatched at all.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fleetcap_common::directive::Play;
use fleetcap_common::executor::{PlayReport, RemoteExecutor, TaskResult, TaskStatus};
use fleetcap_common::network::Host;
use tokio::process::Command;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use super::RemoteError;
use super::render::{self, Step};

/// `extra` key selecting how a host is reached.
pub const CONNECTION_KEY: &str = "connection";
pub const LOCAL_CONNECTION: &str = "local";

/// Exit status ssh reserves for its own errors.
const SSH_ERROR_STATUS: i32 = 255;

#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub ssh: String,
    pub scp: String,
    pub connect_timeout: Duration,
    /// Upper bound for a single command. `None` waits forever.
    pub command_timeout: Option<Duration>,
    /// Passed as `-o <option>` to both ssh and scp.
    pub ssh_options: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            ssh: "ssh".to_string(),
            scp: "scp".to_string(),
            connect_timeout: Duration::from_secs(10),
            command_timeout: Some(Duration::from_secs(300)),
            ssh_options: vec![
                "BatchMode=yes".to_string(),
                "StrictHostKeyChecking=accept-new".to_string(),
            ],
        }
    }
}

impl ShellConfig {
    fn common_options(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
        ];
        for option in &self.ssh_options {
            args.push("-o".to_string());
            args.push(option.clone());
        }
        args
    }

    /// Arguments of `ssh` running `command` on `host`.
    pub fn ssh_args(&self, host: &Host, command: &str) -> Vec<String> {
        let mut args = self.common_options();
        if let Some(port) = host.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push(host.destination());
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }

    /// Arguments of `scp` copying `src` from `host` to the local `dest`.
    pub fn scp_args(&self, host: &Host, src: &str, dest: &Path) -> Vec<String> {
        let mut args = self.common_options();
        args.push("-q".to_string());
        if let Some(port) = host.port {
            args.push("-P".to_string());
            args.push(port.to_string());
        }
        args.push(format!("{}:{}", host.destination(), src));
        args.push(dest.display().to_string());
        args
    }
}

fn is_local(host: &Host) -> bool {
    host.extra.get(CONNECTION_KEY).map(String::as_str) == Some(LOCAL_CONNECTION)
}

#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    config: Arc<ShellConfig>,
}

impl ShellExecutor {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl RemoteExecutor for ShellExecutor {
    async fn run(&self, hosts: &[&Host], play: &Play) -> anyhow::Result<PlayReport> {
        let mut report = PlayReport::new();
        let mut alive = vec![true; hosts.len()];

        for task in &play.tasks {
            debug!("{}: task '{}'", play.name, task.name);

            let mut set = JoinSet::new();
            for (idx, host) in hosts.iter().enumerate() {
                if !alive[idx] {
                    continue;
                }
                let steps = render::render(&task.directive, host);
                let host: Host = (*host).clone();
                let config = Arc::clone(&self.config);
                set.spawn(async move { (idx, run_steps(&config, &host, steps).await) });
            }

            let mut statuses: Vec<Option<TaskStatus>> = vec![None; hosts.len()];
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((idx, status)) => statuses[idx] = Some(status),
                    Err(e) => debug!("{}: dispatch aborted: {e}", task.name),
                }
            }

            for (idx, host) in hosts.iter().enumerate() {
                let status = if alive[idx] {
                    statuses[idx]
                        .take()
                        .unwrap_or_else(|| TaskStatus::Failed("dispatch aborted".to_string()))
                } else {
                    TaskStatus::Skipped
                };
                if alive[idx] && !status.is_ok() && !task.ignore_errors {
                    alive[idx] = false;
                }
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

/// Runs every step, remembering the first failure. Only an unreachable host
/// stops the sequence early.
async fn run_steps(config: &ShellConfig, host: &Host, steps: Vec<Step>) -> TaskStatus {
    let mut status = TaskStatus::Ok;
    for step in steps {
        match run_step(config, host, &step).await {
            Ok(()) => {}
            Err(RemoteError::Unreachable(reason)) => return TaskStatus::Unreachable(reason),
            Err(e) => {
                debug!("{}: {e}", host.alias);
                if status.is_ok() {
                    status = TaskStatus::Failed(e.to_string());
                }
            }
        }
    }
    status
}

async fn run_step(config: &ShellConfig, host: &Host, step: &Step) -> Result<(), RemoteError> {
    match step {
        Step::Remote(command) => {
            trace!("{}: {command}", host.alias);
            if is_local(host) {
                let args = ["-c".to_string(), command.clone()];
                exec("sh", &args, config.command_timeout).await
            } else {
                let args = config.ssh_args(host, command);
                exec_ssh(&config.ssh, &args, config.command_timeout).await
            }
        }
        Step::Fetch { src, dest } => {
            trace!("{}: fetch {src} -> {}", host.alias, dest.display());
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            if is_local(host) {
                tokio::fs::copy(src, dest).await?;
                Ok(())
            } else {
                let args = config.scp_args(host, src, dest);
                exec_ssh(&config.scp, &args, config.command_timeout).await
            }
        }
    }
}

/// Like [`exec`], but the status ssh uses for connection errors means the host
/// could not be reached.
async fn exec_ssh(program: &str, args: &[String], limit: Option<Duration>) -> Result<(), RemoteError> {
    match exec(program, args, limit).await {
        Err(RemoteError::Exit { code, stderr }) if code == SSH_ERROR_STATUS => {
            Err(RemoteError::Unreachable(stderr))
        }
        other => other,
    }
}

async fn exec(program: &str, args: &[String], limit: Option<Duration>) -> Result<(), RemoteError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| RemoteError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let output = match limit {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| RemoteError::Timeout(limit))??,
        None => child.wait_with_output().await?,
    };

    if output.status.success() {
        return Ok(());
    }
    Err(RemoteError::Exit {
        // Killed by a signal.
        code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
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
