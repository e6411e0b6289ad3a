use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use colored::*;
use fleetcap_common::config::Config;
use fleetcap_common::executor::PlayReport;
use fleetcap_core::capture::Capture;
use fleetcap_core::scope;
use fleetcap_core::service::Service;
use tracing::info;

use crate::commands::lifecycle;
use crate::terminal::{print, spinner::CaptureSpinner};

/// Keeps every report produced through it, so the scope can be summarized at the end.
struct Collecting<'s> {
    inner: &'s dyn Service,
    report: Mutex<PlayReport>,
}

impl<'s> Collecting<'s> {
    fn new(inner: &'s dyn Service) -> Self {
        Self {
            inner,
            report: Mutex::new(PlayReport::new()),
        }
    }

    fn keep(&self, report: anyhow::Result<PlayReport>) -> anyhow::Result<PlayReport> {
        let report = report?;
        if let Ok(mut all) = self.report.lock() {
            all.merge(report.clone());
        }
        Ok(report)
    }

    fn into_report(self) -> PlayReport {
        self.report.into_inner().unwrap_or_default()
    }
}

#[async_trait]
impl Service for Collecting<'_> {
    async fn deploy(&self, force: bool) -> anyhow::Result<PlayReport> {
        self.keep(self.inner.deploy(force).await)
    }

    async fn backup(&self) -> anyhow::Result<PlayReport> {
        self.keep(self.inner.backup().await)
    }

    async fn destroy(&self) -> anyhow::Result<PlayReport> {
        self.keep(self.inner.destroy().await)
    }
}

/// Ctrl-C listener, armed as soon as it is created.
///
/// Once armed, SIGINT no longer terminates the process: an interrupt that
/// arrives while hosts are still being deployed is kept and ends the capture
/// as soon as it starts, so backup and destroy always run.
struct Interrupt {
    #[cfg(unix)]
    signal: tokio::signal::unix::Signal,
}

impl Interrupt {
    fn listen() -> anyhow::Result<Self> {
        #[cfg(unix)]
        let signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .context("failed to listen for Ctrl-C")?;
        Ok(Self {
            #[cfg(unix)]
            signal,
        })
    }

    async fn recv(&mut self) -> anyhow::Result<()> {
        #[cfg(unix)]
        {
            self.signal.recv().await;
            Ok(())
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")
        }
    }
}

/// Deploys, captures until `duration` elapses or Ctrl-C, then backs up and destroys.
pub async fn run(capture: &Capture<'_>, duration: Option<Duration>, cfg: &Config) -> anyhow::Result<bool> {
    print::header("capture session", cfg.quiet);

    let mut interrupt = Interrupt::listen()?;
    let service = Collecting::new(capture);
    let hosts = capture.hosts().len();
    scope::scoped(&service, async {
        let reason = wait(&mut interrupt, duration, hosts, cfg).await?;
        info!("{reason}, collecting captures");
        Ok::<_, anyhow::Error>(())
    })
    .await?;

    Ok(lifecycle::summarize(&service.into_report(), cfg))
}

async fn wait(
    interrupt: &mut Interrupt,
    duration: Option<Duration>,
    hosts: usize,
    cfg: &Config,
) -> anyhow::Result<&'static str> {
    let spinner = CaptureSpinner::start(format!("capturing on {hosts} host(s)"), cfg.quiet > 1);
    let started = Instant::now();
    let mut tick = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            signal = interrupt.recv() => {
                signal?;
                return Ok("interrupted");
            }
            _ = tick.tick() => {
                let elapsed = started.elapsed();
                if duration.is_some_and(|limit| elapsed >= limit) {
                    return Ok("capture duration elapsed");
                }
                spinner.set_message(progress(hosts, elapsed, duration));
            }
        }
    }
}

fn progress(hosts: usize, elapsed: Duration, duration: Option<Duration>) -> String {
    let elapsed = format!("{}s", elapsed.as_secs()).bold().yellow();
    match duration {
        Some(limit) => format!("capturing on {hosts} host(s): {elapsed} / {}s", limit.as_secs()),
        None => format!("capturing on {hosts} host(s): {elapsed} (Ctrl-C to stop)"),
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
