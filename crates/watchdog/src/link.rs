// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! How one side reaches the other: signals out, process creation, reaping

use crate::error::WatchdogError;
use crate::launch::SpawnRequest;
use crate::signals;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

pub trait PeerLink: Send + Sync {
    fn send_beacon(&self, pid: i32) -> Result<(), WatchdogError>;

    fn send_stop(&self, pid: i32) -> Result<(), WatchdogError>;

    /// Start a new peer process and return its pid
    fn spawn(&self, request: &SpawnRequest) -> Result<i32, WatchdogError>;

    /// Collect `pid` if it is an exited child of ours. Never blocks.
    fn reap(&self, pid: i32);
}

/// Signals via kill(2), processes via fork+exec
#[derive(Debug, Clone, Copy, Default)]
pub struct OsPeerLink;

impl PeerLink for OsPeerLink {
    fn send_beacon(&self, pid: i32) -> Result<(), WatchdogError> {
        signals::send(signals::BEACON, pid)
    }

    fn send_stop(&self, pid: i32) -> Result<(), WatchdogError> {
        signals::send(signals::STOP, pid)
    }

    fn spawn(&self, request: &SpawnRequest) -> Result<i32, WatchdogError> {
        let child = request
            .command()
            .spawn()
            .map_err(|source| WatchdogError::Spawn {
                program: request.program.clone(),
                source,
            })?;
        let pid = i32::try_from(child.id()).map_err(|_| WatchdogError::Spawn {
            program: request.program.clone(),
            source: std::io::Error::other("pid out of range"),
        })?;
        tracing::info!(pid, program = %request.program.display(), "spawned peer");
        // The child is reaped through waitpid, not the Child handle
        drop(child);
        Ok(pid)
    }

    fn reap(&self, pid: i32) {
        if pid <= 0 {
            return;
        }
        match waitpid(Pid::from_raw(pid), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                tracing::debug!(pid, "previous peer still present");
            }
            Ok(status) => tracing::debug!(pid, ?status, "reaped previous peer"),
            // Not our child (e.g. the watchdog's guarded parent)
            Err(nix::errno::Errno::ECHILD) => {}
            Err(e) => tracing::debug!(pid, error = %e, "waitpid failed"),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePeerLink, LinkCall};

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
