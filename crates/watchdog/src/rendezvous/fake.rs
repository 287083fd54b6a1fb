// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake rendezvous for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::Rendezvous;
use crate::error::WatchdogError;
use crate::launch::Role;
use std::sync::{Arc, Mutex};

/// Recorded rendezvous call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendezvousCall {
    Arrive(Role),
    AcknowledgeStop(Role),
    AwaitStopAck(Role),
    Destroy,
}

/// Never blocks; records every call
#[derive(Clone, Default)]
pub struct FakeRendezvous {
    calls: Arc<Mutex<Vec<RendezvousCall>>>,
}

impl FakeRendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RendezvousCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self, call: RendezvousCall) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: RendezvousCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl Rendezvous for FakeRendezvous {
    fn arrive(&self, role: Role) -> Result<(), WatchdogError> {
        self.record(RendezvousCall::Arrive(role));
        Ok(())
    }

    fn acknowledge_stop(&self, role: Role) -> Result<(), WatchdogError> {
        self.record(RendezvousCall::AcknowledgeStop(role));
        Ok(())
    }

    fn await_stop_ack(&self, role: Role) -> Result<(), WatchdogError> {
        self.record(RendezvousCall::AwaitStopAck(role));
        Ok(())
    }

    fn destroy(&self) -> Result<(), WatchdogError> {
        self.record(RendezvousCall::Destroy);
        Ok(())
    }
}
