// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-unique identity tokens
//!
//! A [`Uid`] combines a process-local counter, the OS process id and a
//! wall-clock timestamp. Tokens generated within one process never repeat;
//! across processes the pid and timestamp keep them apart.

use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: Mutex<u64> = Mutex::new(1);

/// Identity token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid {
    counter: u64,
    pid: u32,
    time: i64,
}

impl Uid {
    /// Sentinel denoting a failed generation. Never equal to a real token,
    /// since real counters start at 1.
    pub const INVALID: Uid = Uid {
        counter: 0,
        pid: 0,
        time: -1,
    };

    /// Generate a new token, or [`Uid::INVALID`] if the timestamp cannot be read
    pub fn generate() -> Uid {
        let counter = {
            let mut next = COUNTER.lock().unwrap_or_else(|e| e.into_inner());
            let counter = *next;
            *next += 1;
            counter
        };

        let Ok(elapsed) = SystemTime::now().duration_since(UNIX_EPOCH) else {
            return Uid::INVALID;
        };
        let Ok(time) = i64::try_from(elapsed.as_secs()) else {
            return Uid::INVALID;
        };

        Uid {
            counter,
            pid: std::process::id(),
            time,
        }
    }

    pub fn is_valid(&self) -> bool {
        *self != Uid::INVALID
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Seconds since the unix epoch at generation time
    pub fn time(&self) -> i64 {
        self.time
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "uid-invalid");
        }
        write!(f, "{}-{}-{}", self.pid, self.time, self.counter)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
