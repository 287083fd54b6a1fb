// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake peer link for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::PeerLink;
use crate::error::WatchdogError;
use crate::launch::SpawnRequest;
use std::sync::{Arc, Mutex};

/// Recorded link call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCall {
    Beacon { pid: i32 },
    Stop { pid: i32 },
    Spawn { request: SpawnRequest, pid: i32 },
    Reap { pid: i32 },
}

#[derive(Default)]
struct FakeState {
    calls: Vec<LinkCall>,
    next_pid: i32,
    fail_spawn: bool,
    fail_signals: bool,
}

/// Records every call; spawned peers get pids counting up from 1000
#[derive(Clone, Default)]
pub struct FakePeerLink {
    inner: Arc<Mutex<FakeState>>,
}

impl FakePeerLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<LinkCall> {
        self.state().calls.clone()
    }

    pub fn spawns(&self) -> Vec<(SpawnRequest, i32)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LinkCall::Spawn { request, pid } => Some((request, pid)),
                _ => None,
            })
            .collect()
    }

    pub fn beacons_to(&self, pid: i32) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == LinkCall::Beacon { pid })
            .count()
    }

    pub fn set_fail_spawn(&self, fail: bool) {
        self.state().fail_spawn = fail;
    }

    pub fn set_fail_signals(&self, fail: bool) {
        self.state().fail_signals = fail;
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn gone(pid: i32) -> WatchdogError {
    WatchdogError::Signal {
        signal: nix::sys::signal::Signal::SIGUSR1,
        pid,
        source: nix::errno::Errno::ESRCH,
    }
}

impl PeerLink for FakePeerLink {
    fn send_beacon(&self, pid: i32) -> Result<(), WatchdogError> {
        let mut state = self.state();
        state.calls.push(LinkCall::Beacon { pid });
        if state.fail_signals {
            return Err(gone(pid));
        }
        Ok(())
    }

    fn send_stop(&self, pid: i32) -> Result<(), WatchdogError> {
        let mut state = self.state();
        state.calls.push(LinkCall::Stop { pid });
        if state.fail_signals {
            return Err(gone(pid));
        }
        Ok(())
    }

    fn spawn(&self, request: &SpawnRequest) -> Result<i32, WatchdogError> {
        let mut state = self.state();
        if state.fail_spawn {
            return Err(WatchdogError::Spawn {
                program: request.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "fake spawn failure"),
            });
        }
        state.next_pid += 1;
        let pid = 1000 + state.next_pid;
        state.calls.push(LinkCall::Spawn {
            request: request.clone(),
            pid,
        });
        Ok(pid)
    }

    fn reap(&self, pid: i32) {
        self.state().calls.push(LinkCall::Reap { pid });
    }
}
