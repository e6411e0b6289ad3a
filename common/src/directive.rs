//! # Remote Work Vocabulary
//!
//! What to run and where, never how. A [`Play`] is an ordered list of [`Task`]s
//! meant to be run against a whole host group by a
//! [`RemoteExecutor`](crate::executor::RemoteExecutor).
//!
//! Every directive is expected to be idempotent on the remote side:
//! * [`Directive::Packages`] installs only what is missing.
//! * [`Directive::Directory`] creates the directory only if absent.
//! * [`Directive::ShellLoop`] is expanded per host at dispatch time, over a list that
//!   may differ (or be empty) from one host to the next.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::network::host::{Host, HostKey};

/// Renders the shell command of one loop item.
pub type ItemCommand = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Per-host item lists, keyed by host identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostItems {
    by_host: BTreeMap<HostKey, Vec<String>>,
}

impl HostItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: HostKey, items: Vec<String>) {
        self.by_host.insert(key, items);
    }

    /// Items of `key`. Unknown hosts have none.
    pub fn get(&self, key: &HostKey) -> &[String] {
        self.by_host.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn for_host(&self, host: &Host) -> &[String] {
        self.get(&host.key())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HostKey, &Vec<String>)> {
        self.by_host.iter()
    }

    pub fn len(&self) -> usize {
        self.by_host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_host.is_empty()
    }
}

pub enum Directive {
    /// Install the packages that are not installed yet.
    Packages { names: Vec<String> },
    /// Ensure a remote directory exists.
    Directory { path: String },
    /// Run an arbitrary shell command.
    Shell { command: String },
    /// Retrieve a remote file into a local directory (one sub-directory per host).
    Fetch { src: String, dest: PathBuf },
    /// Run `command(item)` for each item the host has in `items`.
    ShellLoop {
        items: Arc<HostItems>,
        command: ItemCommand,
    },
}

impl Directive {
    pub fn kind(&self) -> &'static str {
        match self {
            Directive::Packages { .. } => "packages",
            Directive::Directory { .. } => "directory",
            Directive::Shell { .. } => "shell",
            Directive::Fetch { .. } => "fetch",
            Directive::ShellLoop { .. } => "shell_loop",
        }
    }

    /// Commands of a [`Directive::ShellLoop`] for `host`, empty for other directives.
    pub fn expand_loop(&self, host: &Host) -> Vec<String> {
        match self {
            Directive::ShellLoop { items, command } => items
                .for_host(host)
                .iter()
                .map(|item| command(item.as_str()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Packages { names } => f.debug_struct("Packages").field("names", names).finish(),
            Directive::Directory { path } => f.debug_struct("Directory").field("path", path).finish(),
            Directive::Shell { command } => f.debug_struct("Shell").field("command", command).finish(),
            Directive::Fetch { src, dest } => f
                .debug_struct("Fetch")
                .field("src", src)
                .field("dest", dest)
                .finish(),
            Directive::ShellLoop { items, .. } => f
                .debug_struct("ShellLoop")
                .field("items", items)
                .finish_non_exhaustive(),
        }
    }
}

/// A named directive.
#[derive(Debug)]
pub struct Task {
    pub name: String,
    pub directive: Directive,
    /// A host failing this task keeps running the rest of the play.
    pub ignore_errors: bool,
}

impl Task {
    pub fn new(name: impl Into<String>, directive: Directive) -> Self {
        Self {
            name: name.into(),
            directive,
            ignore_errors: false,
        }
    }

    pub fn packages<S: Into<String>>(name: impl Into<String>, names: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            Directive::Packages {
                names: names.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Directive::Directory { path: path.into() })
    }

    pub fn shell(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(name, Directive::Shell { command: command.into() })
    }

    pub fn fetch(name: impl Into<String>, src: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self::new(
            name,
            Directive::Fetch {
                src: src.into(),
                dest: dest.into(),
            },
        )
    }

    pub fn shell_loop(name: impl Into<String>, items: Arc<HostItems>, command: ItemCommand) -> Self {
        Self::new(name, Directive::ShellLoop { items, command })
    }

    pub fn ignore_errors(mut self) -> Self {
        self.ignore_errors = true;
        self
    }
}

/// Ordered tasks run against one host group.
#[derive(Debug)]
pub struct Play {
    pub name: String,
    pub tasks: Vec<Task>,
}

impl Play {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn add(&mut self, task: Task) -> &mut Self {
        self.tasks.push(task);
        self
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
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
