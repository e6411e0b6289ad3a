mod commands;
mod terminal;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use commands::{CommandLine, Commands, lifecycle, plan, run};
use fleetcap_common::config::Config;
use fleetcap_common::executor::RemoteExecutor;
use fleetcap_common::inventory::Inventory;
use fleetcap_common::network::Network;
use fleetcap_core::capture::{Capture, CaptureOptions};
use fleetcap_core::remote::recorder::RecordingExecutor;
use fleetcap_core::remote::shell::ShellExecutor;
use tracing::error;

use crate::terminal::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet, commands.verbose);

    match dispatch(commands).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(commands: CommandLine) -> anyhow::Result<bool> {
    let inventory = Inventory::load(&commands.inventory)
        .with_context(|| format!("failed to load inventory {}", commands.inventory.display()))?;

    let cfg = Config {
        quiet: commands.quiet,
        dry_run: commands.dry_run,
    };

    let opts = CaptureOptions {
        ifnames: commands.ifnames,
        networks: select_networks(&inventory, &commands.networks, &commands.roles)?,
        options: commands.options,
        backup_dir: commands.backup_dir,
    };

    let recorder = cfg.dry_run.then(|| Arc::new(RecordingExecutor::new()));
    let executor: Arc<dyn RemoteExecutor> = match &recorder {
        Some(recorder) => recorder.clone(),
        None => Arc::new(ShellExecutor::default()),
    };
    let capture = Capture::new(&inventory.hosts, opts, executor);

    let ok = match commands.command {
        Commands::Plan => {
            plan::plan(&capture, &cfg);
            true
        }
        Commands::Deploy { force } => lifecycle::deploy(&capture, force, &cfg).await?,
        Commands::Backup => lifecycle::backup(&capture, &cfg).await?,
        Commands::Destroy => lifecycle::destroy(&capture, &cfg).await?,
        Commands::Run { duration } => run::run(&capture, duration.map(Duration::from_secs), &cfg).await?,
    };

    if let Some(recorder) = recorder {
        plan::print_dispatches(&recorder, &cfg);
    }
    Ok(ok)
}

/// Networks named explicitly, then the ones carrying one of `roles`, each once.
fn select_networks(inventory: &Inventory, names: &[String], roles: &[String]) -> anyhow::Result<Vec<Network>> {
    let mut networks = inventory.networks_named(names)?;
    for role in roles {
        for network in inventory.networks_with_role(role) {
            if !networks.iter().any(|n| n.name == network.name) {
                networks.push(network);
            }
        }
    }
    Ok(networks)
}
