use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fleetcap_common::directive::{Play, Task};
use fleetcap_common::executor::{RemoteExecutor, TaskStatus};
use fleetcap_core::capture::archive_command;
use fleetcap_core::remote::shell::ShellExecutor;
use fleetcap_core::tmux;

use crate::util::{local_host, random_string, temp_dir};

/*************************************************************
               Shell executor over `sh -c`
**************************************************************/

#[tokio::test]
async fn commands_run_on_every_host() {
    let dir = temp_dir();
    let h1 = local_host("h1");
    let h2 = local_host("h2");
    let mut play = Play::new("touch");
    play.add(Task::directory("mkdir", dir.join("a/b").display().to_string()))
        .add(Task::shell("touch", format!("touch {}/a/b/marker", dir.display())));

    let report = ShellExecutor::default().run(&[&h1, &h2], &play).await.unwrap();

    assert!(report.is_success(), "{report:?}");
    assert_eq!(report.results.len(), 4);
    assert!(dir.join("a/b/marker").is_file());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn failed_prerequisite_skips_only_that_host() {
    let dir = temp_dir();
    let ok = local_host("ok");
    let broken = local_host("broken");
    let marker = dir.join("ran");
    let mut play = Play::new("p");
    play.add(Task::shell_loop(
        "prerequisite",
        Arc::new({
            let mut items = fleetcap_common::directive::HostItems::new();
            items.insert(ok.key(), vec!["true".to_string()]);
            items.insert(broken.key(), vec!["false".to_string()]);
            items
        }),
        Arc::new(|item: &str| item.to_string()),
    ))
    .add(Task::shell("after", format!("echo x >> {}", marker.display())));

    let report = ShellExecutor::default().run(&[&ok, &broken], &play).await.unwrap();

    assert_eq!(report.failed_hosts(), vec!["broken"]);
    let statuses: Vec<&TaskStatus> = report.for_host("broken").map(|r| &r.status).collect();
    assert!(matches!(statuses[0], TaskStatus::Failed(_)));
    assert_eq!(statuses[1], &TaskStatus::Skipped);
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "x\n");
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn ignored_failures_do_not_stop_the_play() {
    let host = local_host("h1");
    let mut play = Play::new("p");
    play.add(Task::shell("best effort", "exit 7").ignore_errors())
        .add(Task::shell("next", "true"));

    let report = ShellExecutor::default().run(&[&host], &play).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.results[1].status, TaskStatus::Ok);
}

#[tokio::test]
async fn loop_items_run_even_after_one_fails() {
    let dir = temp_dir();
    let host = local_host("h1");
    let mut items = fleetcap_common::directive::HostItems::new();
    items.insert(host.key(), vec!["a".to_string(), "missing/b".to_string(), "c".to_string()]);
    let base = dir.clone();
    let mut play = Play::new("p");
    play.add(
        Task::shell_loop(
            "touch each",
            Arc::new(items),
            Arc::new(move |item: &str| format!("touch {}/{item}", base.display())),
        )
        .ignore_errors(),
    );

    let report = ShellExecutor::default().run(&[&host], &play).await.unwrap();

    assert!(matches!(report.results[0].status, TaskStatus::Failed(_)));
    assert!(dir.join("a").is_file());
    assert!(dir.join("c").is_file());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn fetch_copies_into_a_per_host_directory() {
    let remote = temp_dir();
    let local = temp_dir();
    let host = local_host("h1");
    let archive = remote.join("capture.tar.gz");
    std::fs::write(&archive, b"pcap bytes").unwrap();

    let mut play = Play::new("p");
    play.add(Task::fetch("fetch", archive.display().to_string(), local.clone()));

    let report = ShellExecutor::default().run(&[&host], &play).await.unwrap();

    assert!(report.is_success(), "{report:?}");
    let fetched = local.join("h1").join("capture.tar.gz");
    assert_eq!(std::fs::read(fetched).unwrap(), b"pcap bytes");
    std::fs::remove_dir_all(&remote).unwrap();
    std::fs::remove_dir_all(&local).unwrap();
}

/*************************************************************
                  Captures on a live host
**************************************************************/

#[tokio::test]
async fn archive_succeeds_while_a_capture_file_grows() {
    let remote = temp_dir();
    let local = temp_dir();
    let host = local_host("h1");
    let pcap = remote.join("out").join("eth0.pcap");
    std::fs::create_dir_all(pcap.parent().unwrap()).unwrap();
    std::fs::write(&pcap, vec![0u8; 1 << 20]).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let stop = stop.clone();
        let pcap = pcap.clone();
        std::thread::spawn(move || {
            let mut file = std::fs::OpenOptions::new().append(true).open(pcap).unwrap();
            while !stop.load(Ordering::Relaxed) {
                file.write_all(&[0xab; 4096]).unwrap();
                std::thread::sleep(Duration::from_millis(1));
            }
        })
    };

    let archive = remote.join("capture.tar.gz").display().to_string();
    let mut play = Play::new("backup");
    play.add(Task::shell(
        "archive",
        archive_command(&archive, &remote.join("out").display().to_string()),
    ))
    .add(Task::fetch("fetch", archive, local.clone()));

    let report = ShellExecutor::default().run(&[&host], &play).await.unwrap();
    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();

    assert!(report.is_success(), "{report:?}");
    assert!(local.join("h1").join("capture.tar.gz").is_file());
    std::fs::remove_dir_all(&remote).unwrap();
    std::fs::remove_dir_all(&local).unwrap();
}

#[tokio::test]
async fn archive_of_a_missing_directory_still_fails() {
    let remote = temp_dir();
    let local = temp_dir();
    let host = local_host("h1");
    let archive = remote.join("capture.tar.gz").display().to_string();
    let mut play = Play::new("backup");
    play.add(Task::shell(
        "archive",
        archive_command(&archive, &remote.join("never-created").display().to_string()),
    ))
    .add(Task::fetch("fetch", archive, local.clone()));

    let report = ShellExecutor::default().run(&[&host], &play).await.unwrap();

    assert!(matches!(report.results[0].status, TaskStatus::Failed(_)), "{report:?}");
    assert_eq!(report.results[1].status, TaskStatus::Skipped);
    std::fs::remove_dir_all(&remote).unwrap();
    std::fs::remove_dir_all(&local).unwrap();
}

#[tokio::test]
async fn vlan_session_restarts_and_stops() {
    if std::process::Command::new("tmux").arg("-V").output().is_err() {
        eprintln!("tmux not installed, skipping");
        return;
    }
    let host = local_host("h1");
    let session = format!("fc{}.100", random_string(8).to_lowercase());

    let mut deploy = Play::new("deploy");
    deploy
        .add(Task::shell("start", tmux::start(&session, "sleep 60")))
        .add(Task::shell("start again", tmux::start(&session, "sleep 60")))
        .add(Task::shell("running", tmux::has_session(&session)));
    let mut destroy = Play::new("destroy");
    destroy
        .add(Task::shell("stop", tmux::stop(&session)))
        .add(Task::shell("gone", format!("! {}", tmux::has_session(&session))));

    let executor = ShellExecutor::default();
    let started = executor.run(&[&host], &deploy).await.unwrap();
    let stopped = executor.run(&[&host], &destroy).await.unwrap();

    assert!(started.is_success(), "{started:?}");
    assert!(stopped.is_success(), "{stopped:?}");
}
