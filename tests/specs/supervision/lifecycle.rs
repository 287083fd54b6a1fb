//! Start/stop specs for a healthy pair

use crate::prelude::*;
use std::time::{Duration, Instant};

#[test]
#[ignore = "runs a real supervision pair for ~12s"]
fn healthy_pair_never_respawns_and_stops_cleanly() {
    let pair = Pair::new("healthy");
    // 2 x miss threshold of healthy operation
    let mut demo = pair.demo(10);

    let guarded: i32 = demo
        .expect_line("guarded pid:", Duration::from_secs(10))
        .parse()
        .unwrap();
    assert_eq!(guarded, demo.pid());
    let watchdog: i32 = demo
        .expect_line("watchdog pid:", Duration::from_secs(5))
        .parse()
        .unwrap();
    assert!(alive(watchdog));
    demo.expect_line("critical section", Duration::from_secs(5));

    demo.expect_line("stopping", Duration::from_secs(20));
    let stop_began = Instant::now();
    assert_eq!(demo.expect_line("respawns:", Duration::from_secs(10)), "0");
    demo.expect_line("stopped", Duration::from_secs(5));
    assert!(demo.wait(Duration::from_secs(5)));

    // Bounded by the stop-check interval plus one poll
    assert!(
        stop_began.elapsed() < Duration::from_secs(5),
        "stop took {:?}",
        stop_began.elapsed()
    );
    assert!(!pair.semaphores_present());

    let deadline = Instant::now() + Duration::from_secs(5);
    while alive(watchdog) {
        assert!(Instant::now() < deadline, "watchdog {} still running", watchdog);
        std::thread::sleep(Duration::from_millis(100));
    }

    let log = pair.watchdog_log();
    assert!(log.contains("--- vigild: starting (pid: "), "{}", log);
}

#[test]
#[ignore = "runs a real supervision pair"]
fn short_demo_stops_before_first_stop_check() {
    let pair = Pair::new("short");
    let mut demo = pair.demo(0);

    let watchdog: i32 = demo
        .expect_line("watchdog pid:", Duration::from_secs(10))
        .parse()
        .unwrap();
    assert_eq!(demo.expect_line("respawns:", Duration::from_secs(10)), "0");
    assert!(demo.wait(Duration::from_secs(5)));
    assert!(!pair.semaphores_present());

    // The stop was acknowledged, so the watchdog got past its rendezvous
    assert!(
        wait_for_exit(watchdog, Duration::from_secs(10)),
        "watchdog {} left running",
        watchdog
    );
    assert!(pair.watchdog_log().contains("rendezvous complete"));
}
