//! Respawn specs: a side that stops answering is replaced

use crate::prelude::*;
use nix::sys::signal::Signal;
use std::time::{Duration, Instant};

#[test]
#[ignore = "runs a real supervision pair for ~20s"]
fn frozen_watchdog_is_respawned_exactly_once() {
    let pair = Pair::new("frozen");
    let mut demo = pair.demo(20);

    let original: i32 = demo
        .expect_line("watchdog pid:", Duration::from_secs(10))
        .parse()
        .unwrap();
    demo.expect_line("critical section", Duration::from_secs(5));

    // Let a few healthy beacons pass, then freeze the watchdog
    std::thread::sleep(Duration::from_secs(2));
    signal(original, Signal::SIGSTOP);

    demo.expect_line("stopping", Duration::from_secs(30));
    assert_eq!(demo.expect_line("respawns:", Duration::from_secs(10)), "1");
    demo.expect_line("stopped", Duration::from_secs(5));
    let succeeded = demo.wait(Duration::from_secs(5));

    // The frozen original never learns it was replaced
    signal(original, Signal::SIGKILL);

    assert!(succeeded);
    assert!(!pair.semaphores_present());
    assert!(pair.watchdog_log().matches("--- vigild: starting").count() >= 2);
}

#[test]
#[ignore = "runs a real supervision pair for ~25s"]
fn killed_guarded_process_is_respawned_by_the_watchdog() {
    let pair = Pair::new("killed");
    let mut demo = pair.demo(8);

    let original = demo.pid();
    let watchdog: i32 = demo
        .expect_line("watchdog pid:", Duration::from_secs(10))
        .parse()
        .unwrap();
    demo.expect_line("critical section", Duration::from_secs(5));

    std::thread::sleep(Duration::from_secs(2));
    demo.kill();

    let deadline = Instant::now() + Duration::from_secs(20);
    let respawned = loop {
        let log = pair.watchdog_log();
        let logged = log
            .lines()
            .any(|line| line.contains("peer respawned") && line.contains("role=watchdog"));
        let children: Vec<i32> = children_of(watchdog)
            .into_iter()
            .filter(|pid| *pid != original)
            .collect();
        if logged && !children.is_empty() {
            break children[0];
        }
        assert!(Instant::now() < deadline, "no respawn logged:\n{}", log);
        std::thread::sleep(Duration::from_millis(200));
    };
    assert!(alive(respawned));

    // The replacement finishes its own demo and stops the pair
    assert!(
        wait_for_exit(watchdog, Duration::from_secs(30)),
        "watchdog {} still running",
        watchdog
    );
    assert!(wait_for_exit(respawned, Duration::from_secs(10)));
    assert!(!pair.semaphores_present());
}
