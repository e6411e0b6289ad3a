use std::sync::Arc;

use fleetcap_common::inventory::Inventory;
use fleetcap_core::capture::{Capture, CaptureOptions};
use fleetcap_core::remote::recorder::RecordingExecutor;
use fleetcap_core::service::Service;

use crate::util::{remote_commands, started_sessions, temp_dir};

const LAB: &str = r#"
networks:
  - name: control
    cidr: 192.168.1.0/24
  - name: data
    cidr: 10.10.0.0/16
    roles: [experiment]
hosts:
  - address: 192.168.1.10
    alias: server
    user: root
    port: 2222
    interfaces:
      - name: eno1
        addresses: [192.168.1.10/24]
      - name: ens4
        addresses: [10.10.0.10/16]
  - address: 192.168.1.11
    alias: client
    interfaces:
      - name: eno1
        addresses: [192.168.1.11/24]
      - name: ens5
        network: data
"#;

/*************************************************************
                 Inventory to capture plan
**************************************************************/

#[tokio::test]
async fn inventory_file_drives_resolution() {
    let dir = temp_dir();
    let path = dir.join("lab.yaml");
    std::fs::write(&path, LAB).unwrap();

    let inventory = Inventory::load(&path).unwrap();
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(
        &inventory.hosts,
        CaptureOptions {
            networks: inventory.networks_with_role("experiment"),
            ..CaptureOptions::default()
        },
        recorder.clone(),
    );

    assert_eq!(capture.interfaces().for_host(&inventory.hosts[0]), ["ens4".to_string()]);
    assert_eq!(capture.interfaces().for_host(&inventory.hosts[1]), ["ens5".to_string()]);

    capture.deploy(false).await.unwrap();
    assert_eq!(started_sessions(&remote_commands(&recorder, "server")), vec!["ens4"]);
    assert_eq!(started_sessions(&remote_commands(&recorder, "client")), vec!["ens5"]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn several_networks_accumulate_interfaces() {
    let inventory = Inventory::from_yaml(LAB).unwrap();
    let networks = inventory.networks_named(&["data", "control"]).unwrap();
    let capture = Capture::new(
        &inventory.hosts,
        CaptureOptions::default().with_network(networks[0].clone()).with_network(networks[1].clone()),
        Arc::new(RecordingExecutor::new()),
    );

    // Host order, not network order.
    assert_eq!(
        capture.interfaces().for_host(&inventory.hosts[0]),
        ["eno1".to_string(), "ens4".to_string()]
    );
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let path = temp_dir().join("nope.yaml");
    let err = Inventory::load(&path).unwrap_err();
    assert!(err.to_string().contains("nope.yaml"), "{err}");
}
