//! Request records and the per-request wake signal.

use crate::task::TaskHandle;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Acquisition mode for a lock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Shared (read) mode: multiple holders may proceed concurrently.
    Share,
    /// Exclusive (write) mode: a sole holder, excluding all others.
    Exclusive,
}

impl Mode {
    /// Short textual form for log and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Share => "share",
            Mode::Exclusive => "exclusive",
        }
    }
}

/// Private wake signal owned by a single request.
///
/// The grant engine triggers it when the request enters the granted batch;
/// the waiter blocks on it in bounded ticks so that liveness and deadline
/// checks keep running even if no notification arrives.
#[derive(Debug)]
pub(crate) struct WakeSignal {
    notified: Mutex<bool>,
    cond: Condvar,
}

impl WakeSignal {
    fn new() -> Self {
        Self {
            notified: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Mark the signal as fired and wake the waiter. Idempotent.
    pub(crate) fn notify(&self) {
        let mut notified = self.notified.lock().unwrap_or_else(PoisonError::into_inner);
        if !*notified {
            *notified = true;
            self.cond.notify_one();
        }
    }

    /// Block until notified or until `tick` elapses, whichever comes first.
    /// Returns whether the signal has fired.
    pub(crate) fn wait_for(&self, tick: Duration) -> bool {
        let notified = self.notified.lock().unwrap_or_else(PoisonError::into_inner);
        if *notified {
            return true;
        }
        let (notified, _timeout) = self
            .cond
            .wait_timeout(notified, tick)
            .unwrap_or_else(PoisonError::into_inner);
        *notified
    }
}

/// One pending or granted acquisition attempt.
///
/// Granted-ness is never stored here: it is derived from the request's
/// position in the queue relative to the current granted batch.
#[derive(Debug)]
pub(crate) struct Request {
    requester: TaskHandle,
    mode: Mode,
    wake: Arc<WakeSignal>,
}

impl Request {
    pub(crate) fn new(requester: TaskHandle, mode: Mode) -> Self {
        Self {
            requester,
            mode,
            wake: Arc::new(WakeSignal::new()),
        }
    }

    pub(crate) fn requester(&self) -> &TaskHandle {
        &self.requester
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn wake(&self) -> Arc<WakeSignal> {
        Arc::clone(&self.wake)
    }
}
