use std::sync::Arc;

use fleetcap_common::network::Host;
use fleetcap_core::capture::{Capture, CaptureOptions, ARCHIVE};
use fleetcap_core::remote::recorder::RecordingExecutor;
use fleetcap_core::remote::render::Step;
use fleetcap_core::scope;
use fleetcap_core::service::Service;

use crate::util::{n1, remote_commands, started_sessions, stopped_sessions, temp_dir, two_hosts};

/*************************************************************
                    Target selection
**************************************************************/

#[tokio::test]
async fn empty_filters_only_prepare_hosts() {
    let hosts = two_hosts();
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(&hosts, CaptureOptions::default(), recorder.clone());

    capture.deploy(false).await.unwrap();

    let plays = recorder.plays();
    let kinds: Vec<&str> = plays[0].tasks.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec!["packages", "directory", "shell_loop"]);
    for host in ["h1", "h2"] {
        let commands = remote_commands(&recorder, host);
        assert_eq!(commands.len(), 2, "{host}: {commands:?}");
        assert!(started_sessions(&commands).is_empty());
    }
}

#[tokio::test]
async fn explicit_names_start_and_stop_one_session_each() {
    let hosts = two_hosts();
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(
        &hosts,
        CaptureOptions::default()
            .with_ifname("eth0")
            .with_ifname("eth1")
            .with_ifname("any"),
        recorder.clone(),
    );

    capture.deploy(false).await.unwrap();
    capture.destroy().await.unwrap();

    let plays = recorder.plays();
    let deploy_names: Vec<&str> = plays[0].tasks.iter().map(|t| t.name.as_str()).collect();
    let destroy_names: Vec<&str> = plays[1].tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(&deploy_names[2..5], &["tcpdump for eth0", "tcpdump for eth1", "tcpdump for any"]);
    assert_eq!(
        &destroy_names[..3],
        &["Stopping tcpdump on eth0", "Stopping tcpdump on eth1", "Stopping tcpdump on any"]
    );

    let commands = remote_commands(&recorder, "h2");
    assert_eq!(started_sessions(&commands), vec!["eth0", "eth1", "any"]);
    assert_eq!(stopped_sessions(&commands), vec!["eth0", "eth1", "any"]);
}

#[tokio::test]
async fn resolved_interfaces_use_a_single_loop_task() {
    let hosts = vec![Host::new("10.0.0.1")
        .with_alias("h1")
        .with_interface(fleetcap_common::network::HostInterface::new("eth0").on_network("N1"))
        .with_interface(fleetcap_common::network::HostInterface::new("eth1").on_network("N1"))];
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(&hosts, CaptureOptions::default().with_network(n1()), recorder.clone());

    capture.deploy(false).await.unwrap();
    capture.destroy().await.unwrap();

    let plays = recorder.plays();
    let deploy_kinds: Vec<&str> = plays[0].tasks.iter().map(|t| t.kind).collect();
    let destroy_kinds: Vec<&str> = plays[1].tasks.iter().map(|t| t.kind).collect();
    assert_eq!(deploy_kinds.iter().filter(|k| **k == "shell_loop").count(), 1);
    assert_eq!(deploy_kinds.iter().filter(|k| **k == "shell").count(), 0);
    assert_eq!(destroy_kinds, vec!["shell_loop"]);

    let commands = remote_commands(&recorder, "h1");
    assert_eq!(started_sessions(&commands), vec!["eth0", "eth1"]);
    assert_eq!(stopped_sessions(&commands), vec!["eth0", "eth1"]);
}

#[tokio::test]
async fn two_host_scenario_expands_per_host() {
    let hosts = two_hosts();
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(&hosts, CaptureOptions::default().with_network(n1()), recorder.clone());

    assert_eq!(capture.interfaces().for_host(&hosts[0]), ["eth0".to_string()]);
    assert_eq!(capture.interfaces().for_host(&hosts[1]), ["wlan0".to_string()]);

    capture.deploy(false).await.unwrap();

    let looped: Vec<_> = recorder
        .dispatches()
        .into_iter()
        .filter(|d| d.task == "tcpdump on some interfaces")
        .collect();
    assert_eq!(looped.len(), 2);
    for dispatch in &looped {
        assert_eq!(dispatch.steps.len(), 1, "{}: {:?}", dispatch.host, dispatch.steps);
    }
    assert_eq!(started_sessions(&remote_commands(&recorder, "h1")), vec!["eth0"]);
    assert_eq!(started_sessions(&remote_commands(&recorder, "h2")), vec!["wlan0"]);
}

/*************************************************************
                    Lifecycle laws
**************************************************************/

#[tokio::test]
async fn destroy_twice_is_harmless() {
    let hosts = two_hosts();
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(&hosts, CaptureOptions::default().with_ifname("eth0"), recorder.clone());

    let first = capture.destroy().await.unwrap();
    let first_commands = remote_commands(&recorder, "h1");
    recorder.clear();
    let second = capture.destroy().await.unwrap();

    assert!(first.is_success());
    assert!(second.is_success());
    assert_eq!(first_commands, remote_commands(&recorder, "h1"));
    assert!(first_commands.iter().all(|c| c.ends_with("|| true")));
}

#[tokio::test]
async fn forced_redeploy_leaves_nothing_behind() {
    let hosts = two_hosts();
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(
        &hosts,
        CaptureOptions::default().with_ifname("any").with_network(n1()),
        recorder.clone(),
    );

    capture.deploy(true).await.unwrap();
    capture.destroy().await.unwrap();

    for host in ["h1", "h2"] {
        let commands = remote_commands(&recorder, host);
        let mut started = started_sessions(&commands);
        let mut stopped = stopped_sessions(&commands);
        started.sort();
        stopped.sort();
        stopped.dedup();
        assert!(!started.is_empty());
        assert!(
            started.iter().all(|s| stopped.contains(s)),
            "{host}: started {started:?}, stopped {stopped:?}"
        );
    }
}

#[tokio::test]
async fn scope_backs_up_and_destroys_once_on_body_error() {
    let hosts = two_hosts();
    let dir = temp_dir();
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(
        &hosts,
        CaptureOptions::default().with_ifname("eth0").with_backup_dir(&dir),
        recorder.clone(),
    );

    let result: anyhow::Result<()> = scope::scoped(&capture, async { anyhow::bail!("experiment failed") }).await;

    assert_eq!(result.unwrap_err().to_string(), "experiment failed");
    let plays: Vec<String> = recorder.plays().into_iter().map(|p| p.name).collect();
    assert_eq!(
        plays,
        vec!["destroy tcpdump", "deploy tcpdump", "backup tcpdump", "destroy tcpdump"]
    );
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn scope_backs_up_and_destroys_once_on_body_panic() {
    let hosts = two_hosts();
    let dir = temp_dir();
    let recorder = Arc::new(RecordingExecutor::new());

    let outcome = std::thread::scope(|s| {
        s.spawn(|| {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let capture = Capture::new(
                &hosts,
                CaptureOptions::default().with_ifname("eth0").with_backup_dir(&dir),
                recorder.clone(),
            );
            runtime.block_on(scope::scoped(&capture, async {
                if !hosts.is_empty() {
                    panic!("experiment crashed");
                }
                Ok(())
            }))
        })
        .join()
    });

    assert!(outcome.is_err());
    let plays: Vec<String> = recorder.plays().into_iter().map(|p| p.name).collect();
    assert_eq!(plays.iter().filter(|p| *p == "backup tcpdump").count(), 1);
    assert_eq!(plays.last().map(String::as_str), Some("destroy tcpdump"));
    std::fs::remove_dir_all(&dir).unwrap();
}

/*************************************************************
                        Backup
**************************************************************/

#[tokio::test]
async fn backup_keeps_unrelated_local_files() {
    let hosts = two_hosts();
    let dir = temp_dir();
    std::fs::write(dir.join("notes.txt"), "keep me").unwrap();
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(&hosts, CaptureOptions::default().with_backup_dir(&dir), recorder.clone());

    capture.backup().await.unwrap();
    capture.backup().await.unwrap();

    assert_eq!(std::fs::read_to_string(dir.join("notes.txt")).unwrap(), "keep me");
    let fetches: Vec<Step> = recorder
        .dispatches()
        .into_iter()
        .flat_map(|d| d.steps)
        .filter(|s| matches!(s, Step::Fetch { .. }))
        .collect();
    assert_eq!(fetches.len(), 4);
    assert!(fetches.contains(&Step::Fetch {
        src: ARCHIVE.to_string(),
        dest: dir.join("h2").join(ARCHIVE),
    }));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn backup_does_not_stop_captures() {
    let hosts = two_hosts();
    let dir = temp_dir();
    let recorder = Arc::new(RecordingExecutor::new());
    let capture = Capture::new(
        &hosts,
        CaptureOptions::default().with_ifname("eth0").with_backup_dir(&dir),
        recorder.clone(),
    );

    capture.backup().await.unwrap();

    let commands = remote_commands(&recorder, "h1");
    assert!(stopped_sessions(&commands).is_empty());
    assert_eq!(commands, vec![format!("tar -czf {ARCHIVE} /tmp/__enoslib_tcpdump__ || [ $? -eq 1 ]")]);
    std::fs::remove_dir_all(&dir).unwrap();
}
