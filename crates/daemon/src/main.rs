// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! vigil watchdog (vigild)
//!
//! Supervises a guarded process and is supervised by it in turn. Started by
//! the guarded process as `vigild -- <program> [args...]`; the arguments are
//! what it re-executes if the guarded process stops answering.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;

use tracing::{error, info};

use crate::lifecycle::{Config, LifecycleError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let guarded = match lifecycle::parse_args(std::env::args_os()) {
        Ok(guarded) => guarded,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    let config = Config::load()?;

    // Write startup marker to log (before tracing setup)
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config)?;

    info!(guarded = %guarded, namespace = %config.watchdog.namespace, "Starting vigild");

    let outcome = match lifecycle::run(&config, guarded) {
        Ok(outcome) => outcome,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Watchdog failed: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    info!(reason = ?outcome.reason, "vigild stopped");
    drop(log_guard);
    std::process::exit(lifecycle::exit_code(&outcome));
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- vigild: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- vigild: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write a fatal error synchronously to the log file
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Watchdog failed: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config.log_path.parent().ok_or(LifecycleError::NoStateDir)?;
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(
        dir,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
