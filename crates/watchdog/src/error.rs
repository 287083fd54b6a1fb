// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the supervision protocol

use crate::config::ConfigError;
use nix::sys::signal::Signal;
use std::path::PathBuf;
use thiserror::Error;
use vigil_core::SchedulerError;

/// Errors that can occur while starting, running or stopping supervision
#[derive(Debug, Error)]
pub enum WatchdogError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("semaphore {name}: {source}")]
    Semaphore {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install {signal:?} handler: {source}")]
    SignalInstall {
        signal: Signal,
        #[source]
        source: nix::Error,
    },

    #[error("failed to send {signal:?} to pid {pid}: {source}")]
    Signal {
        signal: Signal,
        pid: i32,
        #[source]
        source: nix::Error,
    },

    #[error("no peer process recorded")]
    NoPeer,

    #[error("failed to spawn {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid peer marker {0:?}")]
    InvalidMarker(String),

    #[error("failed to start monitor thread: {0}")]
    Thread(#[source] std::io::Error),

    #[error("monitor thread panicked")]
    ThreadPanicked,

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}
