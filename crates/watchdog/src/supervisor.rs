// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starting and stopping supervision
//!
//! The guarded process calls [`start`] and later [`Watchdog::stop`]; the
//! protocol then runs on a dedicated thread while the caller's work proceeds
//! on its own threads. The watchdog process calls [`run_watchdog`], which
//! owns its main thread until the pair is stopped or a respawn fails.

use crate::config::WatchdogConfig;
use crate::error::WatchdogError;
use crate::launch::{self, LaunchDescriptor, Role, SpawnRequest};
use crate::link::{OsPeerLink, PeerLink};
use crate::liveness::{Liveness, LIVENESS};
use crate::rendezvous::{self, Rendezvous, SemaphoreRendezvous};
use crate::signals;
use crate::tasks::{CheckLiveness, CheckStop, EmitBeacon, ProtocolShared};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use vigil_core::{Clock, RunOutcome, Scheduler, StopHandle, SystemClock};

/// One side's protocol: its shared state plus the task cadence
pub struct Protocol {
    shared: ProtocolShared,
    beacon_interval: Duration,
    check_interval: Duration,
    stop_interval: Duration,
    poll_interval: Duration,
}

impl Protocol {
    pub fn new(
        role: Role,
        config: &WatchdogConfig,
        guarded: &LaunchDescriptor,
        liveness: &'static Liveness,
        link: Arc<dyn PeerLink>,
        rendezvous: Arc<dyn Rendezvous>,
        own_pid: i32,
    ) -> Self {
        Self {
            shared: ProtocolShared {
                role,
                liveness,
                link,
                rendezvous,
                respawn: SpawnRequest::for_peer(role, guarded, config, own_pid),
                miss_threshold: config.miss_threshold,
            },
            beacon_interval: config.beacon_interval,
            check_interval: config.check_interval,
            stop_interval: config.stop_interval,
            poll_interval: config.poll_interval,
        }
    }

    pub fn role(&self) -> Role {
        self.shared.role
    }

    /// Request that creates this side's peer
    pub fn peer_request(&self) -> &SpawnRequest {
        &self.shared.respawn
    }

    /// A scheduler loaded with emit-beacon, check-liveness and check-stop
    pub fn scheduler<C: Clock>(&self, clock: C) -> Result<Scheduler<C>, WatchdogError> {
        let mut scheduler = Scheduler::with_clock(clock).with_poll_interval(self.poll_interval);
        let stop = scheduler.stop_handle();
        scheduler.add_task(self.beacon_interval, EmitBeacon::new(self.shared.clone()))?;
        scheduler.add_task(self.check_interval, CheckLiveness::new(self.shared.clone()))?;
        scheduler.add_task(self.stop_interval, CheckStop::new(self.shared.clone(), stop))?;
        Ok(scheduler)
    }
}

/// Handle to supervision running on behalf of the guarded process
pub struct Watchdog {
    liveness: &'static Liveness,
    link: Arc<dyn PeerLink>,
    rendezvous: Arc<dyn Rendezvous>,
    scheduler: StopHandle,
    /// Closed once the monitor thread is past the rendezvous
    arrived: Receiver<()>,
    monitor: JoinHandle<Result<RunOutcome, WatchdogError>>,
}

impl Watchdog {
    /// Run `scheduler` on a new thread once the peer has arrived
    pub fn spawn<C: Clock>(
        protocol: &Protocol,
        mut scheduler: Scheduler<C>,
    ) -> Result<Self, WatchdogError> {
        let shared = protocol.shared.clone();
        let rendezvous = Arc::clone(&shared.rendezvous);
        let role = shared.role;
        let stop = scheduler.stop_handle();
        let (arrival, arrived) = mpsc::channel();

        let monitor = thread::Builder::new()
            .name("vigil-watchdog".to_string())
            .spawn(move || -> Result<RunOutcome, WatchdogError> {
                let arrival_result = rendezvous.arrive(role);
                drop(arrival);
                arrival_result?;
                let outcome = scheduler.run();
                tracing::info!(%role, reason = ?outcome.reason, status = %outcome.last_status, "supervision loop exited");
                Ok(outcome)
            })
            .map_err(WatchdogError::Thread)?;

        Ok(Self {
            liveness: shared.liveness,
            link: shared.link,
            rendezvous: shared.rendezvous,
            scheduler: stop,
            arrived,
            monitor,
        })
    }

    /// Current watchdog pid
    pub fn peer_pid(&self) -> Option<i32> {
        self.liveness.peer()
    }

    /// Times this side has respawned the watchdog
    pub fn respawns(&self) -> u32 {
        self.liveness.respawns()
    }

    /// Whether the supervision loop is still going
    pub fn is_running(&self) -> bool {
        !self.monitor.is_finished()
    }

    /// End supervision on both sides.
    ///
    /// Waits for the startup rendezvous if it is still in progress, so the
    /// watchdog has its handlers installed before it is signalled. Then
    /// blocks until the watchdog acknowledges. If the watchdog cannot be
    /// signalled at all, the acknowledgment is not awaited.
    ///
    /// The inherited peer marker is removed from the process environment
    /// after the monitor thread has exited. Other threads of the caller must
    /// not be reading the environment at that point.
    pub fn stop(self) -> Result<RunOutcome, WatchdogError> {
        // Disconnects when the monitor thread passes (or fails) the rendezvous
        let _ = self.arrived.recv();

        let peer = self.liveness.peer();
        tracing::info!(?peer, "stopping supervision");

        let signalled = match peer {
            Some(pid) => match self.link.send_stop(pid) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(pid, error = %e, "watchdog unreachable, not waiting for ack");
                    false
                }
            },
            None => false,
        };
        if signalled {
            self.rendezvous.await_stop_ack(Role::Guarded)?;
        }

        self.scheduler.stop();
        if let Err(e) = self.rendezvous.destroy() {
            tracing::warn!(error = %e, "failed to remove semaphores");
        }

        let outcome = self
            .monitor
            .join()
            .map_err(|_| WatchdogError::ThreadPanicked)??;
        launch::clear_peer_marker();

        if let Some(pid) = peer {
            self.link.reap(pid);
        }
        tracing::info!(reason = ?outcome.reason, "supervision stopped");
        Ok(outcome)
    }
}

fn own_pid() -> i32 {
    nix::unistd::getpid().as_raw()
}

/// Begin supervising the current process, with configuration from the environment
pub fn start(guarded: LaunchDescriptor) -> Result<Watchdog, WatchdogError> {
    start_with(guarded, WatchdogConfig::load()?)
}

/// Begin supervising the current process.
///
/// Without an inherited peer marker this spawns the watchdog; with one, the
/// marked process is adopted as the peer. Returns once the monitor thread is
/// running; the rendezvous completes on that thread.
pub fn start_with(guarded: LaunchDescriptor, config: WatchdogConfig) -> Result<Watchdog, WatchdogError> {
    config.validate()?;
    let marker = launch::peer_marker()?;
    if marker.is_none() {
        rendezvous::remove_stale(&config)?;
    }

    let rendezvous = Arc::new(SemaphoreRendezvous::open(&config)?);
    let result = start_guarded(&guarded, &config, marker, Arc::clone(&rendezvous));
    if result.is_err() {
        if let Err(e) = rendezvous.destroy() {
            tracing::warn!(error = %e, "failed to remove semaphores after failed start");
        }
    }
    result
}

fn start_guarded(
    guarded: &LaunchDescriptor,
    config: &WatchdogConfig,
    marker: Option<i32>,
    rendezvous: Arc<SemaphoreRendezvous>,
) -> Result<Watchdog, WatchdogError> {
    signals::install()?;
    LIVENESS.reset();

    let link: Arc<dyn PeerLink> = Arc::new(OsPeerLink);
    let protocol = Protocol::new(
        Role::Guarded,
        config,
        guarded,
        &LIVENESS,
        Arc::clone(&link),
        rendezvous,
        own_pid(),
    );
    let scheduler = protocol.scheduler(SystemClock)?;

    let peer = match marker {
        Some(pid) => {
            tracing::info!(peer = pid, "adopting inherited watchdog");
            pid
        }
        None => link.spawn(protocol.peer_request())?,
    };
    LIVENESS.set_peer(peer);
    tracing::info!(pid = own_pid(), peer, namespace = %config.namespace, "supervision started");

    Watchdog::spawn(&protocol, scheduler)
}

/// Run the watchdog role on the current thread until stopped or a
/// respawn fails
pub fn run_watchdog(
    guarded: LaunchDescriptor,
    config: WatchdogConfig,
) -> Result<RunOutcome, WatchdogError> {
    config.validate()?;
    let peer = match launch::peer_marker()? {
        Some(pid) => pid,
        None => nix::unistd::getppid().as_raw(),
    };

    let rendezvous = Arc::new(SemaphoreRendezvous::open(&config)?);
    signals::install()?;
    LIVENESS.reset();
    LIVENESS.set_peer(peer);

    let protocol = Protocol::new(
        Role::Watchdog,
        &config,
        &guarded,
        &LIVENESS,
        Arc::new(OsPeerLink),
        rendezvous.clone(),
        own_pid(),
    );
    let mut scheduler = protocol.scheduler(SystemClock)?;

    tracing::info!(pid = own_pid(), peer, guarded = %guarded, "watchdog starting");
    rendezvous.arrive(Role::Watchdog)?;

    let outcome = scheduler.run();
    tracing::info!(reason = ?outcome.reason, status = %outcome.last_status, respawns = LIVENESS.respawns(), "watchdog exiting");
    Ok(outcome)
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
