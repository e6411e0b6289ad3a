pub mod lifecycle;
pub mod plan;
pub mod run;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use fleetcap_core::capture::LOCAL_OUTPUT_DIR;

#[derive(Parser)]
#[command(name = "fleetcap")]
#[command(about = "Packet capture across a fleet of remote hosts.")]
pub struct CommandLine {
    /// Inventory file (YAML) describing hosts and networks
    #[arg(short, long)]
    pub inventory: PathBuf,

    /// Capture this interface on every host (repeatable, `any` for all of them)
    #[arg(long = "ifname", value_name = "IF")]
    pub ifnames: Vec<String>,

    /// Capture the interfaces attached to this inventory network (repeatable)
    #[arg(long = "network", value_name = "NAME")]
    pub networks: Vec<String>,

    /// Capture the interfaces attached to networks with this role (repeatable)
    #[arg(long = "role", value_name = "ROLE")]
    pub roles: Vec<String>,

    /// Extra tcpdump arguments, e.g. "-s 96 port 80"
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub options: String,

    /// Where fetched archives are stored
    #[arg(long, default_value = LOCAL_OUTPUT_DIR)]
    pub backup_dir: PathBuf,

    /// Print the remote commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Less output (-q hides headers, -qq only errors)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what would be captured on each host
    #[command(alias = "p")]
    Plan,
    /// Start the captures
    #[command(alias = "d")]
    Deploy {
        /// Stop the captures of a previous deploy first
        #[arg(long)]
        force: bool,
    },
    /// Fetch the capture files without stopping anything
    #[command(alias = "b")]
    Backup,
    /// Stop the captures
    Destroy,
    /// Deploy, wait, then back up and destroy
    #[command(alias = "r")]
    Run {
        /// Seconds to capture for. Runs until Ctrl-C when omitted
        #[arg(short, long, value_name = "SECS")]
        duration: Option<u64>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
