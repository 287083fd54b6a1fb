// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal channels between the two sides of a pair
//!
//! `SIGUSR1` means "I am alive", `SIGUSR2` means "please stop". The handlers
//! read the sender pid from `siginfo` and forward it to [`LIVENESS`]; they
//! do nothing else.

#![allow(unsafe_code)]

use crate::error::WatchdogError;
use crate::liveness::LIVENESS;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::Pid;

pub const BEACON: Signal = Signal::SIGUSR1;
pub const STOP: Signal = Signal::SIGUSR2;

type SigHandlerFn = extern "C" fn(libc::c_int, *mut libc::siginfo_t, *mut libc::c_void);

extern "C" fn on_beacon(_signo: libc::c_int, info: *mut libc::siginfo_t, _ctx: *mut libc::c_void) {
    if let Some(sender) = sender_pid(info) {
        LIVENESS.on_beacon(sender);
    }
}

extern "C" fn on_stop(_signo: libc::c_int, info: *mut libc::siginfo_t, _ctx: *mut libc::c_void) {
    if let Some(sender) = sender_pid(info) {
        LIVENESS.on_stop(sender);
    }
}

fn sender_pid(info: *const libc::siginfo_t) -> Option<i32> {
    if info.is_null() {
        return None;
    }
    // SAFETY: the kernel hands SA_SIGINFO handlers a valid siginfo_t, and
    // si_pid is populated for signals sent with kill(2).
    Some(unsafe { (*info).si_pid() })
}

/// Install the beacon and stop handlers on this process
pub fn install() -> Result<(), WatchdogError> {
    let flags = SaFlags::SA_SIGINFO | SaFlags::SA_RESTART;
    for (sig, handler) in [(BEACON, on_beacon as SigHandlerFn), (STOP, on_stop)] {
        let action = SigAction::new(SigHandler::SigAction(handler), flags, SigSet::empty());
        // SAFETY: both handlers only perform atomic stores on a static.
        unsafe { signal::sigaction(sig, &action) }
            .map_err(|source| WatchdogError::SignalInstall { signal: sig, source })?;
    }
    tracing::debug!("signal handlers installed");
    Ok(())
}

/// Deliver `sig` to `pid`. Non-positive pids are refused so a missing peer
/// can never turn into a process-group broadcast.
pub fn send(sig: Signal, pid: i32) -> Result<(), WatchdogError> {
    if pid <= 0 {
        return Err(WatchdogError::NoPeer);
    }
    signal::kill(Pid::from_raw(pid), sig).map_err(|source| WatchdogError::Signal {
        signal: sig,
        pid,
        source,
    })
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
