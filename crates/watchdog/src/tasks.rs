// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three periodic tasks each side runs
//!
//! These are the only place protocol decisions are made. They read the
//! atomics the signal handlers write and act on them at their own cadence.

use crate::launch::{Role, SpawnRequest};
use crate::link::PeerLink;
use crate::liveness::Liveness;
use crate::rendezvous::Rendezvous;
use std::sync::Arc;
use vigil_core::{Action, StopHandle, TaskStatus};

/// What every protocol task on one side needs
#[derive(Clone)]
pub struct ProtocolShared {
    pub role: Role,
    pub liveness: &'static Liveness,
    pub link: Arc<dyn PeerLink>,
    pub rendezvous: Arc<dyn Rendezvous>,
    /// How to recreate the peer
    pub respawn: SpawnRequest,
    pub miss_threshold: u32,
}

/// Count a miss, then tell the peer we are alive
pub struct EmitBeacon {
    shared: ProtocolShared,
}

impl EmitBeacon {
    pub fn new(shared: ProtocolShared) -> Self {
        Self { shared }
    }
}

impl Action for EmitBeacon {
    fn run(&mut self) -> TaskStatus {
        let misses = self.shared.liveness.record_miss();
        match self.shared.liveness.peer() {
            Some(peer) => {
                if let Err(e) = self.shared.link.send_beacon(peer) {
                    // A dead peer is detected by check-liveness, not here
                    tracing::debug!(peer, misses, error = %e, "beacon not delivered");
                }
            }
            None => tracing::debug!(misses, "no peer to beacon"),
        }
        TaskStatus::Repeat
    }
}

/// Respawn the peer once too many beacons were missed
pub struct CheckLiveness {
    shared: ProtocolShared,
}

impl CheckLiveness {
    pub fn new(shared: ProtocolShared) -> Self {
        Self { shared }
    }

    fn respawn(&self) -> Result<i32, crate::WatchdogError> {
        let shared = &self.shared;
        if let Some(old) = shared.liveness.peer() {
            shared.link.reap(old);
        }
        let pid = shared.link.spawn(&shared.respawn)?;
        shared.liveness.set_peer(pid);
        let count = shared.liveness.record_respawn();
        tracing::warn!(role = %shared.role, peer = pid, respawns = count, "peer respawned");
        shared.rendezvous.arrive(shared.role)?;
        Ok(pid)
    }
}

impl Action for CheckLiveness {
    fn run(&mut self) -> TaskStatus {
        let misses = self.shared.liveness.misses();
        if misses <= self.shared.miss_threshold {
            return TaskStatus::Repeat;
        }

        tracing::warn!(
            role = %self.shared.role,
            peer = ?self.shared.liveness.peer(),
            misses,
            "peer presumed dead"
        );
        self.shared.liveness.reset_misses();

        match self.respawn() {
            Ok(_) => TaskStatus::Repeat,
            Err(e) => {
                tracing::error!(role = %self.shared.role, error = %e, "respawn failed, supervision ends");
                TaskStatus::Error
            }
        }
    }
}

/// Acknowledge a peer's stop request and end the local loop
pub struct CheckStop {
    shared: ProtocolShared,
    scheduler: StopHandle,
}

impl CheckStop {
    pub fn new(shared: ProtocolShared, scheduler: StopHandle) -> Self {
        Self { shared, scheduler }
    }
}

impl Action for CheckStop {
    fn run(&mut self) -> TaskStatus {
        if !self.shared.liveness.stop_requested() {
            return TaskStatus::Repeat;
        }
        tracing::info!(role = %self.shared.role, peer = ?self.shared.liveness.peer(), "stop requested by peer");
        if let Err(e) = self.shared.rendezvous.acknowledge_stop(self.shared.role) {
            tracing::error!(error = %e, "failed to acknowledge stop");
        }
        self.scheduler.stop()
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
