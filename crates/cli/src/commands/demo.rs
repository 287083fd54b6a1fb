// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Demo command: a no-op critical section under supervision

use anyhow::{Context, Result};
use std::time::Duration;
use vigil_watchdog::{LaunchDescriptor, WatchdogConfig};

#[derive(clap::Args)]
pub struct DemoArgs {
    /// How long the critical section runs (seconds)
    #[arg(long, default_value = "20")]
    seconds: u64,
}

pub fn handle(args: DemoArgs, config: WatchdogConfig) -> Result<()> {
    let descriptor = LaunchDescriptor::current().context("cannot describe current process")?;
    let watchdog =
        vigil_watchdog::start_with(descriptor, config).context("failed to start supervision")?;

    println!("guarded pid: {}", std::process::id());
    match watchdog.peer_pid() {
        Some(pid) => println!("watchdog pid: {}", pid),
        None => println!("watchdog pid: -"),
    }
    println!("critical section");

    std::thread::sleep(Duration::from_secs(args.seconds));

    let respawns = watchdog.respawns();
    println!("stopping");
    let outcome = watchdog.stop().context("failed to stop supervision")?;
    tracing::debug!(reason = ?outcome.reason, "monitor exited");

    println!("respawns: {}", respawns);
    println!("stopped");
    Ok(())
}
