// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inspect command

use anyhow::Result;
use vigil_watchdog::{NamedSemaphore, WatchdogConfig};

pub fn handle(config: &WatchdogConfig) -> Result<()> {
    println!("namespace: {}", config.namespace);
    for name in [config.guarded_semaphore(), config.watchdog_semaphore()] {
        let state = if NamedSemaphore::exists(&name)? {
            "present"
        } else {
            "absent"
        };
        println!("{:<24} {}", name, state);
    }
    Ok(())
}
