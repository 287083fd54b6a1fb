// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the scheduler

use crate::task::TaskId;
use thiserror::Error;

/// Errors that can occur while managing scheduler tasks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("could not generate a task identity")]
    InvalidTaskId,
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
}
