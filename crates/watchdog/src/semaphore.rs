// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! POSIX named semaphores

#![allow(unsafe_code)]

use crate::error::WatchdogError;
use std::ffi::CString;
use std::io;
use std::ptr::NonNull;

const MODE: libc::c_uint = 0o666;

/// An open handle to a named semaphore, closed on drop
#[derive(Debug)]
pub struct NamedSemaphore {
    name: String,
    sem: NonNull<libc::sem_t>,
}

// SAFETY: POSIX semaphore operations are thread-safe; the handle is only
// closed in Drop, after every borrow has ended.
unsafe impl Send for NamedSemaphore {}
unsafe impl Sync for NamedSemaphore {}

fn c_name(name: &str) -> Result<CString, WatchdogError> {
    CString::new(name).map_err(|e| WatchdogError::Semaphore {
        name: name.to_string(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })
}

impl NamedSemaphore {
    /// Open `name`, creating it with value 0 if it does not exist
    pub fn open(name: &str) -> Result<Self, WatchdogError> {
        let c_name = c_name(name)?;
        // SAFETY: c_name is NUL-terminated; O_CREAT takes mode and value.
        let sem = unsafe { libc::sem_open(c_name.as_ptr(), libc::O_CREAT, MODE, 0 as libc::c_uint) };
        if sem == libc::SEM_FAILED {
            return Err(WatchdogError::Semaphore {
                name: name.to_string(),
                source: io::Error::last_os_error(),
            });
        }
        let sem = NonNull::new(sem).ok_or_else(|| WatchdogError::Semaphore {
            name: name.to_string(),
            source: io::Error::other("sem_open returned null"),
        })?;
        Ok(Self {
            name: name.to_string(),
            sem,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn post(&self) -> Result<(), WatchdogError> {
        // SAFETY: sem is open for the lifetime of self.
        if unsafe { libc::sem_post(self.sem.as_ptr()) } == 0 {
            Ok(())
        } else {
            Err(self.error(io::Error::last_os_error()))
        }
    }

    /// Block until the count is positive, then decrement it.
    /// Retries when a beacon interrupts the wait.
    pub fn wait(&self) -> Result<(), WatchdogError> {
        loop {
            // SAFETY: sem is open for the lifetime of self.
            if unsafe { libc::sem_wait(self.sem.as_ptr()) } == 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(self.error(err));
            }
        }
    }

    /// Decrement if positive. Returns false if the count was zero.
    pub fn try_wait(&self) -> Result<bool, WatchdogError> {
        loop {
            // SAFETY: sem is open for the lifetime of self.
            if unsafe { libc::sem_trywait(self.sem.as_ptr()) } == 0 {
                return Ok(true);
            }
            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EAGAIN) => return Ok(false),
                Some(libc::EINTR) => continue,
                _ => return Err(self.error(err)),
            }
        }
    }

    /// Remove `name` from the OS namespace. Open handles stay usable.
    pub fn unlink(name: &str) -> Result<(), WatchdogError> {
        let c_name = c_name(name)?;
        // SAFETY: c_name is NUL-terminated.
        if unsafe { libc::sem_unlink(c_name.as_ptr()) } == 0 {
            Ok(())
        } else {
            Err(WatchdogError::Semaphore {
                name: name.to_string(),
                source: io::Error::last_os_error(),
            })
        }
    }

    /// Whether `name` is currently present in the OS namespace
    pub fn exists(name: &str) -> Result<bool, WatchdogError> {
        let c_name = c_name(name)?;
        // SAFETY: c_name is NUL-terminated; without O_CREAT no mode is passed.
        let sem = unsafe { libc::sem_open(c_name.as_ptr(), 0) };
        if sem == libc::SEM_FAILED {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::NotFound {
                return Ok(false);
            }
            return Err(WatchdogError::Semaphore {
                name: name.to_string(),
                source: err,
            });
        }
        // SAFETY: sem was just opened above.
        unsafe { libc::sem_close(sem) };
        Ok(true)
    }

    fn error(&self, source: io::Error) -> WatchdogError {
        WatchdogError::Semaphore {
            name: self.name.clone(),
            source,
        }
    }
}

impl Drop for NamedSemaphore {
    fn drop(&mut self) {
        // SAFETY: sem is open and no borrows outlive self.
        if unsafe { libc::sem_close(self.sem.as_ptr()) } != 0 {
            tracing::warn!(name = %self.name, error = %io::Error::last_os_error(), "sem_close failed");
        }
    }
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
