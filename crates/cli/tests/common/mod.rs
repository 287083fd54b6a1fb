// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a unique test identifier using timestamp + atomic counter.
/// This ensures uniqueness even with parallel test execution.
pub fn unique_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_nanos();
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", std::process::id(), timestamp % 1_000_000, counter)
}

/// Unique semaphore namespace for one test
pub fn unique_namespace(prefix: &str) -> String {
    format!("vigil-{}-{}", prefix, unique_id())
}

/// Unlinks a namespace's semaphores when dropped
pub struct NamespaceGuard(pub String);

impl Drop for NamespaceGuard {
    fn drop(&mut self) {
        let _ = assert_cmd::Command::cargo_bin("vigil")
            .map(|mut cmd| cmd.args(["--namespace", &self.0, "cleanup"]).output());
    }
}
