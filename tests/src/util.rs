use std::path::PathBuf;

use fleetcap_common::network::{Host, HostInterface, Network};
use fleetcap_core::remote::recorder::RecordingExecutor;
use fleetcap_core::remote::render::Step;
use fleetcap_core::remote::shell::{CONNECTION_KEY, LOCAL_CONNECTION};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::net::Ipv4Addr;

pub fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
    IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
}

pub fn net(name: &str, cidr: IpNetwork) -> Network {
    Network::new(name, cidr)
}

/// `h1` with `eth0` on N1 and `eth1` on N2, `h2` with `wlan0` on N1.
pub fn two_hosts() -> Vec<Host> {
    vec![
        Host::new("10.0.0.1")
            .with_alias("h1")
            .with_interface(HostInterface::new("eth0").on_network("N1"))
            .with_interface(HostInterface::new("eth1").on_network("N2")),
        Host::new("10.0.0.2")
            .with_alias("h2")
            .with_interface(HostInterface::new("wlan0").on_network("N1")),
    ]
}

pub fn n1() -> Network {
    net("N1", v4(10, 0, 0, 0, 24))
}

pub fn n2() -> Network {
    net("N2", v4(10, 1, 0, 0, 24))
}

/// A host reached through `sh -c` on this machine.
pub fn local_host(alias: &str) -> Host {
    Host::new("127.0.0.1")
        .with_alias(alias)
        .with_extra(CONNECTION_KEY, LOCAL_CONNECTION)
}

pub fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
}

/// A fresh, existing directory under the system temp dir.
pub fn temp_dir() -> PathBuf {
    let path = std::env::temp_dir().join(format!("fleetcap-{}", random_string(16)));
    std::fs::create_dir_all(&path).unwrap();
    path
}

/// Every remote command dispatched to `host`, in order.
pub fn remote_commands(recorder: &RecordingExecutor, host: &str) -> Vec<String> {
    recorder
        .dispatches()
        .into_iter()
        .filter(|d| d.host == host)
        .flat_map(|d| d.steps)
        .filter_map(|step| match step {
            Step::Remote(cmd) => Some(cmd),
            Step::Fetch { .. } => None,
        })
        .collect()
}

/// Session names started by `commands`, read back from `tmux new-session -d -s <name>`.
pub fn started_sessions(commands: &[String]) -> Vec<String> {
    sessions_after(commands, "new-session -d -s ")
}

/// Session names stopped by `commands`, read back from `tmux kill-session -t '=<name>'`.
pub fn stopped_sessions(commands: &[String]) -> Vec<String> {
    sessions_after(commands, "kill-session -t ")
        .into_iter()
        .map(|s| s.trim_matches('\'').trim_start_matches('=').to_string())
        .collect()
}

fn sessions_after(commands: &[String], marker: &str) -> Vec<String> {
    commands
        .iter()
        .filter_map(|cmd| {
            let (_, rest) = cmd.split_once(marker)?;
            rest.split_whitespace().next().map(str::to_string)
        })
        .collect()
}
