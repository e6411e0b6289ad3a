//! # Session Naming & Registry
//!
//! Maps every capture target to the tmux session that runs it.
//!
//! * **Static targets** come from explicit interface names. Their session is
//!   named after the interface in tmux spelling (`eth0.100` runs as `eth0_100`),
//!   so the name used to start is the name used to stop.
//! * **The dynamic target** is a single template applied to the per-host
//!   [`InterfaceTable`] when directives are dispatched. Deploy and destroy share
//!   the template, so they expand to the same sessions without remembering them.

use fleetcap_common::network::Host;

use crate::capture::resolver::InterfaceTable;
use crate::tmux::{self, shell_escape};

/// Interface name tcpdump understands as "every interface".
pub const ANY_INTERFACE: &str = "any";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSession {
    pub id: String,
    pub interface: String,
}

/// The session targets of one capture service instance.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    statics: Vec<StaticSession>,
}

impl SessionRegistry {
    /// One static session per distinct name, first occurrence wins.
    pub fn new<S: AsRef<str>>(ifnames: &[S]) -> Self {
        let mut statics: Vec<StaticSession> = Vec::with_capacity(ifnames.len());
        for name in ifnames {
            let name = name.as_ref();
            if statics.iter().any(|s| s.interface == name) {
                continue;
            }
            statics.push(StaticSession {
                id: tmux::session_name(name),
                interface: name.to_string(),
            });
        }
        Self { statics }
    }

    pub fn statics(&self) -> &[StaticSession] {
        &self.statics
    }

    /// Session name of a dynamically resolved interface.
    pub fn dynamic_session(interface: &str) -> String {
        tmux::session_name(interface)
    }

    /// Every concrete session this registry targets on `host`, statics first.
    pub fn sessions_for(&self, host: &Host, table: &InterfaceTable) -> Vec<String> {
        let mut ids: Vec<String> = self.statics.iter().map(|s| s.id.clone()).collect();
        for interface in table.for_host(host) {
            let id = Self::dynamic_session(interface);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// `tcpdump` writing the traffic of `interface` to `<output_dir>/<interface>.pcap`.
///
/// `options` is appended verbatim.
pub fn capture_command(output_dir: &str, interface: &str, options: &str) -> String {
    let pcap = format!("{output_dir}/{interface}.pcap");
    let mut cmd = format!(
        "tcpdump -w {} -i {}",
        shell_escape(&pcap),
        shell_escape(interface)
    );
    let options = options.trim();
    if !options.is_empty() {
        cmd.push(' ');
        cmd.push_str(options);
    }
    cmd
}

/// Starts the capture of `interface` in its own session.
pub fn start_command(session: &str, output_dir: &str, interface: &str, options: &str) -> String {
    tmux::start(session, &capture_command(output_dir, interface, options))
}

/// Stops the session `session` if it runs.
pub fn stop_command(session: &str) -> String {
    tmux::stop(session)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
