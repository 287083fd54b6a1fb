// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cleanup command

use anyhow::Result;
use vigil_watchdog::WatchdogConfig;

pub fn handle(config: &WatchdogConfig) -> Result<()> {
    let removed = vigil_watchdog::remove_stale(config)?;
    if removed == 0 {
        println!("Nothing to clean up");
    } else {
        println!("Removed {} semaphore(s) from {}", removed, config.namespace);
    }
    Ok(())
}
