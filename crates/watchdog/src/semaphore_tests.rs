// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn unique_name() -> String {
    format!("/vigil-test-{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

struct Unlink(String);

impl Drop for Unlink {
    fn drop(&mut self) {
        let _ = NamedSemaphore::unlink(&self.0);
    }
}

#[test]
fn open_creates_with_zero_count() {
    let name = unique_name();
    let _guard = Unlink(name.clone());

    let sem = NamedSemaphore::open(&name).unwrap();
    assert_eq!(sem.name(), name);
    assert!(!sem.try_wait().unwrap());
}

#[test]
fn post_then_wait_consumes_one() {
    let name = unique_name();
    let _guard = Unlink(name.clone());
    let sem = NamedSemaphore::open(&name).unwrap();

    sem.post().unwrap();
    sem.post().unwrap();
    sem.wait().unwrap();
    assert!(sem.try_wait().unwrap());
    assert!(!sem.try_wait().unwrap());
}

#[test]
fn handles_to_the_same_name_share_a_count() {
    let name = unique_name();
    let _guard = Unlink(name.clone());
    let a = NamedSemaphore::open(&name).unwrap();
    let b = NamedSemaphore::open(&name).unwrap();

    a.post().unwrap();
    assert!(b.try_wait().unwrap());
}

#[test]
fn wait_blocks_until_posted_from_another_thread() {
    let name = unique_name();
    let _guard = Unlink(name.clone());
    let sem = Arc::new(NamedSemaphore::open(&name).unwrap());

    let poster = {
        let sem = Arc::clone(&sem);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            sem.post().unwrap();
        })
    };

    sem.wait().unwrap();
    poster.join().unwrap();
}

#[test]
fn exists_tracks_unlink() {
    let name = unique_name();
    assert!(!NamedSemaphore::exists(&name).unwrap());

    let sem = NamedSemaphore::open(&name).unwrap();
    assert!(NamedSemaphore::exists(&name).unwrap());

    NamedSemaphore::unlink(&name).unwrap();
    assert!(!NamedSemaphore::exists(&name).unwrap());

    // Handle stays usable after unlink
    sem.post().unwrap();
    assert!(sem.try_wait().unwrap());
}

#[test]
fn unlink_missing_name_is_an_error() {
    assert!(NamedSemaphore::unlink(&unique_name()).is_err());
}

#[test]
fn interior_nul_is_rejected() {
    assert!(matches!(
        NamedSemaphore::open("/bad\0name"),
        Err(WatchdogError::Semaphore { .. })
    ));
}
