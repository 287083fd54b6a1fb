// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! vigil-watchdog: mutual supervision of two processes
//!
//! A guarded process and a watchdog process each run a scheduler with three
//! periodic tasks. They exchange liveness beacons over `SIGUSR1`, ask each
//! other to stop over `SIGUSR2`, and synchronize start and stop through a
//! pair of POSIX named semaphores. Whichever side stops hearing from the
//! other respawns it.

pub mod config;
pub mod error;
pub mod launch;
pub mod link;
pub mod liveness;
pub mod rendezvous;
pub mod semaphore;
pub mod signals;
pub mod supervisor;
pub mod tasks;

pub use config::{ConfigError, WatchdogConfig};
pub use error::WatchdogError;
pub use launch::{LaunchDescriptor, Role, SpawnRequest, PEER_PID_ENV};
pub use link::{OsPeerLink, PeerLink};
pub use liveness::{Liveness, LIVENESS};
pub use rendezvous::{remove_stale, Rendezvous, SemaphoreRendezvous};
pub use semaphore::NamedSemaphore;
pub use supervisor::{run_watchdog, start, start_with, Protocol, Watchdog};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use link::{FakePeerLink, LinkCall};
#[cfg(any(test, feature = "test-support"))]
pub use rendezvous::{FakeRendezvous, RendezvousCall};
