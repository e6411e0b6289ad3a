//! # Network Capture Service
//!
//! Runs one `tcpdump` per (host, interface) pair, each in its own detached tmux
//! session, and collects the resulting pcap files.
//!
//! ## Targets
//! * **Explicit interface names** are captured on every host. [`ANY_INTERFACE`]
//!   captures all interfaces at once.
//! * **Networks**: each host captures on its own cards attached to one of them,
//!   resolved once at construction (see [`resolver`]). Requires interface
//!   metadata on the hosts.
//!
//! Both can be combined.
//!
//! ## Lifecycle
//! * `deploy` installs tcpdump and tmux when missing, creates [`REMOTE_OUTPUT_DIR`]
//!   and starts the sessions. Starting a session is best effort: a session that
//!   fails to start does not prevent the next ones.
//! * `backup` archives [`REMOTE_OUTPUT_DIR`] on every host and fetches the archive
//!   into `<backup_dir>/<host alias>/`. Captures keep running, so the last packets
//!   of a file may still be in flight and tar may report it as changed.
//! * `destroy` stops every session of this instance and tolerates the ones that
//!   never started.
//!
//! [`ANY_INTERFACE`]: sessions::ANY_INTERFACE

pub mod resolver;
pub mod sessions;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use fleetcap_common::directive::{Play, Task};
use fleetcap_common::executor::{PlayReport, RemoteExecutor};
use fleetcap_common::network::{Host, Network, Roles};
use fleetcap_common::success;
use tracing::{info, warn};

use crate::service::Service;
use crate::tmux;
use resolver::InterfaceTable;
use sessions::SessionRegistry;

/// Where the pcap files are written on the remote hosts.
pub const REMOTE_OUTPUT_DIR: &str = "/tmp/__enoslib_tcpdump__";
/// Default local directory receiving the archives.
pub const LOCAL_OUTPUT_DIR: &str = "__enoslib_tcpdump__";
/// Archive of [`REMOTE_OUTPUT_DIR`], relative to the remote working directory.
pub const ARCHIVE: &str = "tcpdump.tar.gz";
pub const PACKAGES: [&str; 2] = ["tcpdump", "tmux"];

/// Archives `dir` into `archive`.
///
/// tar exits with 1 when a file grew while it was read, which is the normal
/// case for a running capture. The archive is still written, so only a
/// status above 1 fails.
pub fn archive_command(archive: &str, dir: &str) -> String {
    format!(
        "tar -czf {} {} || [ $? -eq 1 ]",
        tmux::shell_escape(archive),
        tmux::shell_escape(dir)
    )
}

/// What to capture and where to store it.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub ifnames: Vec<String>,
    pub networks: Vec<Network>,
    /// Extra tcpdump arguments, appended verbatim.
    pub options: String,
    pub backup_dir: PathBuf,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            ifnames: Vec::new(),
            networks: Vec::new(),
            options: String::new(),
            backup_dir: PathBuf::from(LOCAL_OUTPUT_DIR),
        }
    }
}

impl CaptureOptions {
    pub fn with_ifname(mut self, ifname: impl Into<String>) -> Self {
        self.ifnames.push(ifname.into());
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.networks.push(network);
        self
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }
}

pub struct Capture<'a> {
    roles: Roles<'a>,
    sessions: SessionRegistry,
    interfaces: Arc<InterfaceTable>,
    options: String,
    backup_dir: PathBuf,
    executor: Arc<dyn RemoteExecutor>,
}

impl<'a> Capture<'a> {
    pub fn new(hosts: &'a [Host], opts: CaptureOptions, executor: Arc<dyn RemoteExecutor>) -> Self {
        // Capture is host scoped, roles don't matter.
        let roles = Roles::single(hosts);
        let interfaces = resolver::resolve(&roles.hosts(), &opts.networks);

        Self {
            roles,
            sessions: SessionRegistry::new(opts.ifnames.as_slice()),
            interfaces: Arc::new(interfaces),
            options: opts.options,
            backup_dir: opts.backup_dir,
            executor,
        }
    }

    pub fn hosts(&self) -> Vec<&'a Host> {
        self.roles.hosts()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn interfaces(&self) -> &InterfaceTable {
        &self.interfaces
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn deploy_play(&self) -> Play {
        let mut play = Play::new("deploy tcpdump");
        play.add(Task::packages("Install dependencies (tcpdump, tmux ...)", PACKAGES))
            .add(Task::directory("Create output directory", REMOTE_OUTPUT_DIR));

        for session in self.sessions.statics() {
            let cmd = sessions::start_command(&session.id, REMOTE_OUTPUT_DIR, &session.interface, &self.options);
            play.add(Task::shell(format!("tcpdump for {}", session.interface), cmd).ignore_errors());
        }

        let options = self.options.clone();
        play.add(
            Task::shell_loop(
                "tcpdump on some interfaces",
                self.interfaces.clone(),
                Arc::new(move |interface: &str| {
                    sessions::start_command(
                        &SessionRegistry::dynamic_session(interface),
                        REMOTE_OUTPUT_DIR,
                        interface,
                        &options,
                    )
                }),
            )
            .ignore_errors(),
        );
        play
    }

    pub fn backup_play(&self) -> Play {
        let mut play = Play::new("backup tcpdump");
        play.add(Task::shell(
            "Archive capture directory",
            archive_command(ARCHIVE, REMOTE_OUTPUT_DIR),
        ))
        .add(Task::fetch("Fetch capture archive", ARCHIVE, self.backup_dir.clone()));
        play
    }

    pub fn destroy_play(&self) -> Play {
        let mut play = Play::new("destroy tcpdump");
        for session in self.sessions.statics() {
            play.add(
                Task::shell(
                    format!("Stopping tcpdump on {}", session.interface),
                    sessions::stop_command(&session.id),
                )
                .ignore_errors(),
            );
        }
        play.add(
            Task::shell_loop(
                "Stopping some tcpdumps",
                self.interfaces.clone(),
                Arc::new(|interface: &str| {
                    sessions::stop_command(&SessionRegistry::dynamic_session(interface))
                }),
            )
            .ignore_errors(),
        );
        play
    }

    async fn run(&self, play: Play) -> anyhow::Result<PlayReport> {
        let hosts = self.roles.hosts();
        info!("{}: {} task(s) on {} host(s)", play.name, play.tasks.len(), hosts.len());

        let report = self
            .executor
            .run(&hosts, &play)
            .await
            .with_context(|| format!("failed to run '{}'", play.name))?;

        for failure in report.failures() {
            if failure.ignored {
                warn!("{}: '{}' {} (ignored)", failure.host, failure.task, failure.status);
            } else {
                warn!("{}: '{}' {}", failure.host, failure.task, failure.status);
            }
        }
        if report.is_success() {
            success!("{} done", play.name);
        }
        Ok(report)
    }
}

#[async_trait]
impl Service for Capture<'_> {
    async fn deploy(&self, force: bool) -> anyhow::Result<PlayReport> {
        let mut report = PlayReport::new();
        if force {
            report.merge(self.destroy().await?);
        }
        report.merge(self.run(self.deploy_play()).await?);
        Ok(report)
    }

    async fn backup(&self) -> anyhow::Result<PlayReport> {
        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .with_context(|| format!("failed to create {}", self.backup_dir.display()))?;
        self.run(self.backup_play()).await
    }

    async fn destroy(&self) -> anyhow::Result<PlayReport> {
        self.run(self.destroy_play()).await
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
