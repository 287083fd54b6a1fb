// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watchdog process lifecycle: argument parsing, paths, run.

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;
use vigil_core::{ExitReason, RunOutcome};
use vigil_watchdog::{ConfigError, LaunchDescriptor, WatchdogConfig, WatchdogError};

/// Overrides the log directory
pub const LOG_DIR_ENV: &str = "VIGIL_LOG_DIR";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Protocol settings shared with the guarded process
    pub watchdog: WatchdogConfig,
    /// Path to this watchdog's log file
    pub log_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, LifecycleError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LifecycleError> {
        let watchdog = WatchdogConfig::load_from(&lookup)?;
        let log_path = log_dir(&lookup)?.join(format!("{}.watchdog.log", watchdog.namespace));
        Ok(Self { watchdog, log_path })
    }
}

/// Errors that can occur while starting or running the watchdog
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("usage: vigild [--] <program> [args...]")]
    Usage,

    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("supervision failed: {0}")]
    Watchdog(#[from] WatchdogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse `vigild [--] <program> [args...]` into the guarded launch descriptor
pub fn parse_args(
    args: impl IntoIterator<Item = impl Into<OsString>>,
) -> Result<LaunchDescriptor, LifecycleError> {
    let mut args = args.into_iter().map(Into::into).skip(1).peekable();
    if args.peek().map(|a| a == "--").unwrap_or(false) {
        args.next();
    }
    LaunchDescriptor::from_argv(args).ok_or(LifecycleError::Usage)
}

/// Run the watchdog role until the pair stops or a respawn fails
pub fn run(config: &Config, guarded: LaunchDescriptor) -> Result<RunOutcome, LifecycleError> {
    Ok(vigil_watchdog::run_watchdog(guarded, config.watchdog.clone())?)
}

/// Process exit code for a finished run
pub fn exit_code(outcome: &RunOutcome) -> i32 {
    match outcome.reason {
        ExitReason::Errored => 1,
        ExitReason::Drained | ExitReason::Stopped => 0,
    }
}

/// Get the log directory for vigil
fn log_dir(lookup: &impl Fn(&str) -> Option<String>) -> Result<PathBuf, LifecycleError> {
    if let Some(dir) = lookup(LOG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    // Use XDG_STATE_HOME or default to ~/.local/state
    if let Some(xdg) = lookup("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("vigil"));
    }

    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/vigil"))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
