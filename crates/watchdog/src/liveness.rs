// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide liveness state shared with the signal handlers
//!
//! Handlers only ever call `on_beacon` and `on_stop`, which touch atomics
//! and nothing else. All decisions are made by the polled protocol tasks.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

/// The one instance the installed signal handlers write to
pub static LIVENESS: Liveness = Liveness::new();

#[derive(Debug)]
pub struct Liveness {
    peer: AtomicI32,
    misses: AtomicU32,
    stop: AtomicBool,
    respawns: AtomicU32,
}

impl Liveness {
    pub const fn new() -> Self {
        Self {
            peer: AtomicI32::new(0),
            misses: AtomicU32::new(0),
            stop: AtomicBool::new(false),
            respawns: AtomicU32::new(0),
        }
    }

    /// Beacon received from `sender`. Async-signal-safe.
    pub fn on_beacon(&self, sender: i32) {
        if self.is_peer(sender) {
            self.misses.store(0, Ordering::SeqCst);
        }
    }

    /// Stop request received from `sender`. Async-signal-safe.
    pub fn on_stop(&self, sender: i32) {
        if self.is_peer(sender) {
            self.stop.store(true, Ordering::SeqCst);
        }
    }

    fn is_peer(&self, sender: i32) -> bool {
        let peer = self.peer.load(Ordering::SeqCst);
        peer > 0 && peer == sender
    }

    /// Count one emit cycle without a beacon; returns the new count
    pub fn record_miss(&self) -> u32 {
        self.misses.fetch_add(1, Ordering::SeqCst).saturating_add(1)
    }

    pub fn misses(&self) -> u32 {
        self.misses.load(Ordering::SeqCst)
    }

    pub fn reset_misses(&self) {
        self.misses.store(0, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn set_peer(&self, pid: i32) {
        self.peer.store(pid, Ordering::SeqCst);
    }

    /// Recorded peer pid, if one is set
    pub fn peer(&self) -> Option<i32> {
        match self.peer.load(Ordering::SeqCst) {
            pid if pid > 0 => Some(pid),
            _ => None,
        }
    }

    pub fn record_respawn(&self) -> u32 {
        self.respawns.fetch_add(1, Ordering::SeqCst).saturating_add(1)
    }

    pub fn respawns(&self) -> u32 {
        self.respawns.load(Ordering::SeqCst)
    }

    /// Clear everything before a new supervision session
    pub fn reset(&self) {
        self.peer.store(0, Ordering::SeqCst);
        self.misses.store(0, Ordering::SeqCst);
        self.stop.store(false, Ordering::SeqCst);
        self.respawns.store(0, Ordering::SeqCst);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
