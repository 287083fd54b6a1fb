// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-threaded periodic task scheduler
//!
//! The run loop repeatedly waits for the earliest due task, runs it, and
//! either reschedules it (on [`TaskStatus::Repeat`]) or drops it. Waiting is
//! a coarse poll: the loop sleeps at most one poll interval at a time, so a
//! [`StopHandle::stop`] takes effect within that interval.

use crate::clock::{Clock, SystemClock};
use crate::error::SchedulerError;
use crate::list::SortedList;
use crate::task::{Action, Task, TaskId, TaskStatus};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound on a single sleep in the due-time wait
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Why the run loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// No tasks left to run
    Drained,
    /// Stopped externally or by a task returning [`TaskStatus::Stop`]
    Stopped,
    /// A task returned [`TaskStatus::Error`]
    Errored,
}

/// Result of [`Scheduler::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason: ExitReason,
    /// Status of the last task that ran, or `Success` if none ran
    pub last_status: TaskStatus,
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Cloneable handle that stops a running scheduler from any thread,
/// including from inside one of its own tasks. A stop requested while the
/// loop is idle makes the next `run` return immediately.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    state: Arc<AtomicU8>,
}

impl StopHandle {
    /// Request the loop to exit at its next poll boundary
    pub fn stop(&self) -> TaskStatus {
        self.state.store(STOPPED, Ordering::SeqCst);
        TaskStatus::Stop
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }

    /// Enter the loop unless a stop is already pending
    fn begin(&self) -> bool {
        self.state
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn finish(&self) {
        self.state.store(IDLE, Ordering::SeqCst);
    }
}

/// Manages periodic tasks ordered by next run time
pub struct Scheduler<C: Clock = SystemClock> {
    queue: SortedList<Task>,
    active: Option<Task>,
    running: StopHandle,
    clock: C,
    poll_interval: Duration,
}

impl Default for Scheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            queue: SortedList::new(Task::by_next_run),
            active: None,
            running: StopHandle::default(),
            clock,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..self
        }
    }

    /// Add a task first due one `interval` from now
    pub fn add_task(
        &mut self,
        interval: Duration,
        action: impl Action + 'static,
    ) -> Result<TaskId, SchedulerError> {
        let task = Task::new(interval, Box::new(action), self.clock.now())
            .ok_or(SchedulerError::InvalidTaskId)?;
        let id = task.id();
        tracing::debug!(task_id = %id, ?interval, "task added");
        self.queue.insert(task);
        Ok(id)
    }

    /// Remove a queued task. The task currently running cannot be removed.
    pub fn remove_task(&mut self, id: TaskId) -> Result<(), SchedulerError> {
        let task = self
            .queue
            .remove_first(|task| task.id() == id)
            .ok_or(SchedulerError::TaskNotFound(id))?;
        drop(task);
        tracing::debug!(task_id = %id, "task removed");
        Ok(())
    }

    /// Run until drained, stopped, or a task fails
    pub fn run(&mut self) -> RunOutcome {
        let mut last_status = TaskStatus::Success;
        let started = self.running.begin();

        let reason = loop {
            if !started || !self.running.is_running() {
                break ExitReason::Stopped;
            }
            let Some(due) = self.queue.peek().map(Task::next_run) else {
                break ExitReason::Drained;
            };
            if !self.wait_until(due) {
                break ExitReason::Stopped;
            }
            let Some(task) = self.queue.pop_front() else {
                break ExitReason::Drained;
            };

            let status = self.active.insert(task).run();
            last_status = status;

            if let Some(mut task) = self.active.take() {
                tracing::debug!(task_id = %task.id(), %status, "task ran");
                if status == TaskStatus::Repeat {
                    task.update_next_run(self.clock.now());
                    self.queue.insert(task);
                }
            }

            match status {
                TaskStatus::Stop => break ExitReason::Stopped,
                TaskStatus::Error => break ExitReason::Errored,
                TaskStatus::Success | TaskStatus::Repeat => {}
            }
        };

        self.running.finish();
        tracing::debug!(?reason, %last_status, remaining = self.size(), "scheduler exited");
        RunOutcome {
            reason,
            last_status,
        }
    }

    /// Block until `due` or until stopped. Returns false if stopped.
    fn wait_until(&self, due: Instant) -> bool {
        loop {
            if !self.running.is_running() {
                return false;
            }
            let now = self.clock.now();
            if due <= now {
                return true;
            }
            self.clock.sleep((due - now).min(self.poll_interval));
        }
    }

    pub fn stop(&self) -> TaskStatus {
        self.running.stop()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    /// Drop every queued task and the active one, running their cleanups
    pub fn clear(&mut self) {
        self.queue.drain().for_each(drop);
        self.active.take();
    }

    /// Queued tasks plus the one currently running
    pub fn size(&self) -> usize {
        self.queue.len() + usize::from(self.active.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.active.is_none()
    }

    /// When the earliest queued task is due
    pub fn next_due(&self) -> Option<Instant> {
        self.queue.peek().map(Task::next_run)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
