use colored::*;
use fleetcap_common::config::Config;
use fleetcap_core::capture::Capture;
use fleetcap_core::remote::recorder::RecordingExecutor;
use fleetcap_core::remote::render::Step;
use tracing::warn;

use crate::fprint;
use crate::terminal::{colors, print};

type Detail = (String, ColoredString);

/// Prints the resolved interfaces and sessions of every host. Nothing runs remotely.
pub fn plan(capture: &Capture<'_>, cfg: &Config) {
    print::header("capture plan", cfg.quiet);

    let hosts = capture.hosts();
    let mut targets = 0;
    for (idx, host) in hosts.iter().enumerate() {
        let interfaces = capture.interfaces().for_host(host);
        let sessions = capture.sessions().sessions_for(host, capture.interfaces());
        targets += sessions.len();

        print::tree_head(idx, &host.alias);
        let details: Vec<Detail> = vec![
            ("Address".to_string(), host.destination().normal()),
            ("Resolved".to_string(), joined(interfaces)),
            ("Sessions".to_string(), joined(&sessions)),
        ];
        print::as_tree_one_level(details);
        if idx + 1 != hosts.len() {
            fprint!();
        }
    }

    if targets == 0 {
        warn!("nothing to capture: no --ifname given and no interface matched the networks");
    }
}

fn joined(items: &[String]) -> ColoredString {
    if items.is_empty() {
        return "none".dimmed();
    }
    items.join(", ").color(colors::ACCENT)
}

/// Prints what a dry run would have executed, grouped by play and task.
pub fn print_dispatches(recorder: &RecordingExecutor, cfg: &Config) {
    print::header("dry run", cfg.quiet);

    let mut current: Option<(String, String)> = None;
    for dispatch in recorder.dispatches() {
        let key = (dispatch.play.clone(), dispatch.task.clone());
        if current.as_ref() != Some(&key) {
            print::print_status(format!("{} / {}", dispatch.play.bold(), dispatch.task));
            current = Some(key);
        }
        for step in &dispatch.steps {
            let line = match step {
                Step::Remote(cmd) => cmd.clone(),
                Step::Fetch { src, dest } => format!("fetch {src} -> {}", dest.display()),
            };
            fprint!(&format!("  {} {}", dispatch.host.color(colors::PRIMARY), line.color(colors::COMMAND)));
        }
    }
}
