// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup handshake and stop acknowledgment between the two sides
//!
//! Each role owns one semaphore. The guarded side posts its own and then
//! waits on the watchdog's; the watchdog waits on the guarded side's and
//! then posts its own. Neither side proceeds until both are installed, and
//! once the guarded side returns both counts are back at zero, so a later
//! stop acknowledgment on the guarded semaphore cannot be confused with a
//! leftover arrival. Stop acknowledgment posts the semaphore of the side
//! that asked to stop.

use crate::config::WatchdogConfig;
use crate::error::WatchdogError;
use crate::launch::Role;
use crate::semaphore::NamedSemaphore;

pub trait Rendezvous: Send + Sync {
    /// Block until both sides are installed
    fn arrive(&self, role: Role) -> Result<(), WatchdogError>;

    /// Release the peer of `role`, which is blocked in `await_stop_ack`
    fn acknowledge_stop(&self, role: Role) -> Result<(), WatchdogError>;

    /// Block until the peer acknowledges a stop request
    fn await_stop_ack(&self, role: Role) -> Result<(), WatchdogError>;

    /// Remove both names from the OS namespace
    fn destroy(&self) -> Result<(), WatchdogError>;
}

/// Rendezvous over the pair's two named semaphores
#[derive(Debug)]
pub struct SemaphoreRendezvous {
    guarded: NamedSemaphore,
    watchdog: NamedSemaphore,
}

impl SemaphoreRendezvous {
    pub fn open(config: &WatchdogConfig) -> Result<Self, WatchdogError> {
        Ok(Self {
            guarded: NamedSemaphore::open(&config.guarded_semaphore())?,
            watchdog: NamedSemaphore::open(&config.watchdog_semaphore())?,
        })
    }

    fn owned_by(&self, role: Role) -> &NamedSemaphore {
        match role {
            Role::Guarded => &self.guarded,
            Role::Watchdog => &self.watchdog,
        }
    }
}

impl Rendezvous for SemaphoreRendezvous {
    fn arrive(&self, role: Role) -> Result<(), WatchdogError> {
        tracing::debug!(%role, "arriving at rendezvous");
        match role {
            Role::Guarded => {
                self.guarded.post()?;
                self.watchdog.wait()?;
            }
            // Consume the guarded post before releasing it
            Role::Watchdog => {
                self.guarded.wait()?;
                self.watchdog.post()?;
            }
        }
        tracing::info!(%role, "rendezvous complete");
        Ok(())
    }

    fn acknowledge_stop(&self, role: Role) -> Result<(), WatchdogError> {
        self.owned_by(role.peer()).post()
    }

    fn await_stop_ack(&self, role: Role) -> Result<(), WatchdogError> {
        self.owned_by(role).wait()
    }

    fn destroy(&self) -> Result<(), WatchdogError> {
        // Attempt both even if the first fails
        let guarded = NamedSemaphore::unlink(self.guarded.name());
        let watchdog = NamedSemaphore::unlink(self.watchdog.name());
        guarded.and(watchdog)
    }
}

/// Unlink both names for `config`, ignoring names that are already gone.
/// Returns how many were removed.
pub fn remove_stale(config: &WatchdogConfig) -> Result<usize, WatchdogError> {
    let mut removed = 0;
    for name in [config.guarded_semaphore(), config.watchdog_semaphore()] {
        if NamedSemaphore::exists(&name)? {
            NamedSemaphore::unlink(&name)?;
            tracing::warn!(%name, "removed stale semaphore");
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRendezvous, RendezvousCall};

#[cfg(test)]
#[path = "rendezvous_tests.rs"]
mod tests;
