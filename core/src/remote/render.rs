//! Turns directives into the concrete steps run for one host.

use std::path::{Path, PathBuf};

use fleetcap_common::directive::Directive;
use fleetcap_common::network::Host;

use crate::tmux::shell_escape;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A shell command run on the host.
    Remote(String),
    /// Copy `src` from the host to the local path `dest`.
    Fetch { src: String, dest: PathBuf },
}

/// Steps of `directive` for `host`, in order. Loops expand over the host's own items.
pub fn render(directive: &Directive, host: &Host) -> Vec<Step> {
    match directive {
        Directive::Packages { names } => vec![Step::Remote(install_missing(names))],
        Directive::Directory { path } => vec![Step::Remote(format!("mkdir -p {}", shell_escape(path)))],
        Directive::Shell { command } => vec![Step::Remote(command.clone())],
        Directive::Fetch { src, dest } => vec![Step::Fetch {
            src: src.clone(),
            dest: fetch_destination(dest, host, src),
        }],
        Directive::ShellLoop { .. } => directive
            .expand_loop(host)
            .into_iter()
            .map(Step::Remote)
            .collect(),
    }
}

/// `<dest>/<host alias>/<file name of src>`.
pub fn fetch_destination(dest: &Path, host: &Host, src: &str) -> PathBuf {
    let file_name = Path::new(src)
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| src.into());
    dest.join(&host.alias).join(file_name)
}

/// Installs, with apt, the packages dpkg does not know about yet.
fn install_missing(names: &[String]) -> String {
    if names.is_empty() {
        return "true".to_string();
    }
    let list: Vec<String> = names.iter().map(|n| shell_escape(n)).collect();
    format!(
        "missing=''; for pkg in {}; do dpkg -s \"$pkg\" >/dev/null 2>&1 || missing=\"$missing $pkg\"; done; \
         [ -z \"$missing\" ] || {{ apt-get update -qq && DEBIAN_FRONTEND=noninteractive apt-get install -y -qq $missing; }}",
        list.join(" ")
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
