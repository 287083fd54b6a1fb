// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch descriptors and the peer marker
//!
//! A spawned peer learns its counterpart's pid from `VIGIL_PEER_PID` in its
//! environment. Every spawn, initial or respawn and in either direction,
//! sets the marker explicitly to the spawner's pid.

use crate::config::{WatchdogConfig, NAMESPACE_ENV};
use crate::error::WatchdogError;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

pub const PEER_PID_ENV: &str = "VIGIL_PEER_PID";

/// Which side of the pair this process plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Guarded,
    Watchdog,
}

impl Role {
    pub fn peer(self) -> Role {
        match self {
            Role::Guarded => Role::Watchdog,
            Role::Watchdog => Role::Guarded,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Guarded => write!(f, "guarded"),
            Role::Watchdog => write!(f, "watchdog"),
        }
    }
}

/// Executable path and argument vector needed to recreate a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchDescriptor {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl LaunchDescriptor {
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Descriptor of the running process, resolved to an absolute executable
    pub fn current() -> std::io::Result<Self> {
        let program = std::env::current_exe()?;
        Ok(Self {
            program,
            args: std::env::args_os().skip(1).collect(),
        })
    }

    /// Build from a full argv (program first). None when argv is empty.
    pub fn from_argv(argv: impl IntoIterator<Item = impl Into<OsString>>) -> Option<Self> {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next()?;
        Some(Self {
            program: PathBuf::from(program),
            args: argv.collect(),
        })
    }

    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<OsString> {
        std::iter::once(self.program.clone().into_os_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for LaunchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Everything needed to (re)create the peer of a given role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(String, String)>,
    /// Watchdog processes get null stdio so they never write to the caller's terminal
    pub detach_stdio: bool,
}

impl SpawnRequest {
    /// Request that recreates the peer of `role`, marked with `own_pid`
    pub fn for_peer(
        role: Role,
        guarded: &LaunchDescriptor,
        config: &WatchdogConfig,
        own_pid: i32,
    ) -> Self {
        let env = vec![
            (PEER_PID_ENV.to_string(), own_pid.to_string()),
            (NAMESPACE_ENV.to_string(), config.namespace.clone()),
        ];

        match role {
            Role::Guarded => {
                let mut args = vec![OsString::from("--")];
                args.extend(guarded.argv());
                Self {
                    program: config.resolve_watchdog_binary(),
                    args,
                    env,
                    detach_stdio: true,
                }
            }
            Role::Watchdog => Self {
                program: guarded.program.clone(),
                args: guarded.args.clone(),
                env,
                detach_stdio: false,
            },
        }
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        for (key, value) in &self.env {
            command.env(key, value);
        }
        if self.detach_stdio {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }
        command
    }
}

/// Peer pid inherited from the spawner, if any
pub fn peer_marker() -> Result<Option<i32>, WatchdogError> {
    parse_marker(std::env::var(PEER_PID_ENV).ok().as_deref())
}

pub(crate) fn parse_marker(value: Option<&str>) -> Result<Option<i32>, WatchdogError> {
    match value {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<i32>() {
            Ok(pid) if pid > 0 => Ok(Some(pid)),
            _ => Err(WatchdogError::InvalidMarker(raw.to_string())),
        },
    }
}

/// Forget the inherited peer so a later start spawns a fresh watchdog.
///
/// Mutates the process environment, so call it only once the supervision
/// thread has been joined.
pub fn clear_peer_marker() {
    std::env::remove_var(PEER_PID_ENV);
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
