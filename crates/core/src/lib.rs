// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vigil-core: the timing engine behind vigil
//!
//! This crate provides:
//! - A clock abstraction with a fake for deterministic tests
//! - Process-unique identity tokens
//! - A stable sorted container
//! - Tasks and the single-threaded periodic scheduler that runs them

pub mod clock;
pub mod error;
pub mod id;
pub mod list;
pub mod scheduler;
pub mod task;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::SchedulerError;
pub use id::Uid;
pub use list::SortedList;
pub use scheduler::{ExitReason, RunOutcome, Scheduler, StopHandle, DEFAULT_POLL_INTERVAL};
pub use task::{Action, FnAction, Task, TaskId, TaskStatus};
