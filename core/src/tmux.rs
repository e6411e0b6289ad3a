//! Tmux command builder.
//!
//! Every background process runs in its own detached tmux session, so that it
//! survives the connection that started it and can be stopped by name later.
//! Builders only produce shell strings; running them is the executor's job.
//!
//! tmux rewrites `.` and `:` in session names to `_`, so every builder goes
//! through [`session_name`] first. Targets are prefixed with `=` so that `eth0`
//! never matches a session called `eth0_100`.

/// The name tmux actually gives a session requested as `name`.
pub fn session_name(name: &str) -> String {
    name.replace(['.', ':'], "_")
}

/// Starts `command` in a detached session called `session`, unless such a session already exists.
pub fn start(session: &str, command: &str) -> String {
    format!(
        "{} || tmux new-session -d -s {} {}",
        has_session(session),
        shell_escape(&session_name(session)),
        shell_escape(command)
    )
}

/// Kills the session called `session` if it exists. Always exits successfully.
pub fn stop(session: &str) -> String {
    format!(
        "{} && tmux kill-session -t {} || true",
        has_session(session),
        exact_target(session)
    )
}

/// Succeeds when a session called `session` exists.
pub fn has_session(session: &str) -> String {
    format!("tmux has-session -t {} 2>/dev/null", exact_target(session))
}

fn exact_target(session: &str) -> String {
    shell_escape(&format!("={}", session_name(session)))
}

/// Quotes `s` for a POSIX shell, leaving simple words untouched.
pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '%' | ':' | '@' | ','))
    {
        return s.to_string();
    }
    let escaped = s.replace('\'', "'\\''");
    format!("'{escaped}'")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
