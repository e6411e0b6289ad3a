use colored::*;
use fleetcap_common::config::Config;
use fleetcap_common::executor::{PlayReport, TaskStatus};
use fleetcap_common::success;
use fleetcap_core::capture::Capture;
use fleetcap_core::service::Service;
use tracing::error;

use crate::fprint;
use crate::terminal::{colors, print};

pub async fn deploy(capture: &Capture<'_>, force: bool, cfg: &Config) -> anyhow::Result<bool> {
    print::header("deploying captures", cfg.quiet);
    let report = capture.deploy(force).await?;
    Ok(summarize(&report, cfg))
}

pub async fn backup(capture: &Capture<'_>, cfg: &Config) -> anyhow::Result<bool> {
    print::header("fetching captures", cfg.quiet);
    let report = capture.backup().await?;
    let ok = summarize(&report, cfg);
    if ok {
        success!("archives stored under {}", capture.backup_dir().display());
    }
    Ok(ok)
}

pub async fn destroy(capture: &Capture<'_>, cfg: &Config) -> anyhow::Result<bool> {
    print::header("stopping captures", cfg.quiet);
    let report = capture.destroy().await?;
    Ok(summarize(&report, cfg))
}

/// Prints one line per host and returns whether no host failed for good.
pub fn summarize(report: &PlayReport, cfg: &Config) -> bool {
    let mut hosts: Vec<&str> = Vec::new();
    for result in &report.results {
        if !hosts.contains(&result.host.as_str()) {
            hosts.push(&result.host);
        }
    }

    if cfg.quiet == 0 {
        fprint!();
        print::header("summary", cfg.quiet);
    }
    let key_width = hosts.iter().map(|h| h.chars().count()).max().unwrap_or(0);
    for host in &hosts {
        print::aligned_line(host, host_status(report, host), key_width);
    }

    let failed = report.failed_hosts();
    let ignored = report.failures().filter(|r| r.ignored).count();
    let line = format!(
        "{} host(s), {} failed, {} ignored error(s)",
        hosts.len().to_string().bold(),
        failed.len().to_string().color(if failed.is_empty() { colors::OK } else { colors::FAILED }),
        ignored.to_string().color(colors::IGNORED),
    );
    if cfg.quiet == 0 {
        print::fat_separator();
        print::centerln(&line);
    }

    if failed.is_empty() {
        return true;
    }
    error!("failed on {}", failed.join(", "));
    false
}

fn host_status(report: &PlayReport, host: &str) -> ColoredString {
    if let Some(result) = report.fatal_failures().find(|r| r.host == host) {
        return format!("{}: {}", result.task, result.status).color(colors::FAILED);
    }
    let ignored = report
        .for_host(host)
        .filter(|r| !matches!(r.status, TaskStatus::Ok))
        .count();
    if ignored > 0 {
        return format!("ok ({ignored} ignored)").color(colors::IGNORED);
    }
    "ok".color(colors::OK)
}
