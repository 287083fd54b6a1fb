// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedulable units of work
//!
//! A [`Task`] pairs an [`Action`] with a recurrence interval and the instant
//! it is next due. Dropping a task runs the action's cleanup.

use crate::id::Uid;
use std::fmt;
use std::time::{Duration, Instant};

/// Identity of a task inside a scheduler
pub type TaskId = Uid;

/// Outcome of a single action run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TaskStatus {
    Error = -1,
    Success = 0,
    Stop = 1,
    Repeat = 2,
}

impl TaskStatus {
    pub fn is_error(self) -> bool {
        self == TaskStatus::Error
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Error => "error",
            TaskStatus::Success => "success",
            TaskStatus::Stop => "stop",
            TaskStatus::Repeat => "repeat",
        };
        f.write_str(name)
    }
}

/// The work a task performs.
///
/// Whatever the action needs (its parameters) lives in the implementor.
pub trait Action: Send {
    fn run(&mut self) -> TaskStatus;

    /// Release resources held by the action. Runs when the task is destroyed
    /// and additionally right after any run that returns [`TaskStatus::Error`].
    fn cleanup(&mut self) {}
}

type CleanupFn = Box<dyn FnMut() + Send>;

/// Adapts closures into an [`Action`]
pub struct FnAction<F> {
    run: F,
    cleanup: Option<CleanupFn>,
}

impl<F> FnAction<F>
where
    F: FnMut() -> TaskStatus + Send,
{
    pub fn new(run: F) -> Self {
        Self { run, cleanup: None }
    }

    pub fn with_cleanup(self, cleanup: impl FnMut() + Send + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
            ..self
        }
    }
}

impl<F> Action for FnAction<F>
where
    F: FnMut() -> TaskStatus + Send,
{
    fn run(&mut self) -> TaskStatus {
        (self.run)()
    }

    fn cleanup(&mut self) {
        if let Some(cleanup) = self.cleanup.as_mut() {
            cleanup();
        }
    }
}

impl<F> fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("has_cleanup", &self.cleanup.is_some())
            .finish()
    }
}

pub struct Task {
    id: TaskId,
    action: Box<dyn Action>,
    interval: Duration,
    next_run: Instant,
}

impl Task {
    /// Create a task first due at `now + interval`.
    ///
    /// Returns `None` if no identity token could be generated.
    pub fn new(interval: Duration, action: Box<dyn Action>, now: Instant) -> Option<Self> {
        let id = Uid::generate();
        if !id.is_valid() {
            return None;
        }

        Some(Self {
            id,
            action,
            interval,
            next_run: now + interval,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_run(&self) -> Instant {
        self.next_run
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_run <= now
    }

    /// Run the action once, cleaning up immediately if it fails
    pub fn run(&mut self) -> TaskStatus {
        let status = self.action.run();
        if status.is_error() {
            self.action.cleanup();
        }
        status
    }

    pub fn update_next_run(&mut self, now: Instant) {
        self.next_run = now + self.interval;
    }

    /// Queue order: earliest `next_run` first
    pub fn by_next_run(a: &Task, b: &Task) -> std::cmp::Ordering {
        a.next_run.cmp(&b.next_run)
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        self.action.cleanup();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("interval", &self.interval)
            .field("next_run", &self.next_run)
            .finish()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
