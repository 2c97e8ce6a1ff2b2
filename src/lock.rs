//! The shared/exclusive lock: request queue and grant engine.
//!
//! # Grant model
//!
//! Requests live in one FIFO queue. The granted batch is always a prefix of
//! that queue: exactly the head if the head is exclusive, otherwise the
//! maximal contiguous run of shared requests from the head. The batch is a
//! pure function of the queue contents and is recomputed after every
//! mutation (enqueue, release, timeout or dead-owner removal), never
//! tracked incrementally.
//!
//! # Blocking
//!
//! Queue mutation and grant recomputation happen under one internal mutex.
//! A waiter blocks outside that mutex on its request's private wake signal,
//! in bounded ticks, re-checking grant status, owner liveness, and deadline
//! expiry on each wake.

use crate::error::{Result, SELockError};
use crate::request::{Mode, Request};
use crate::task::TaskHandle;
use log::{trace, warn};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::ThreadId;
use std::time::{Duration, Instant};

/// Default tick between liveness and deadline re-checks while waiting.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Number of requests in the currently granted batch.
///
/// Pure function of the queue contents; safe and idempotent to re-run after
/// any mutation.
pub(crate) fn granted_len(queue: &VecDeque<Request>) -> usize {
    match queue.front().map(Request::mode) {
        None => 0,
        Some(Mode::Exclusive) => 1,
        Some(Mode::Share) => queue
            .iter()
            .take_while(|request| request.mode() == Mode::Share)
            .count(),
    }
}

/// Position of the calling task's (oldest) entry, if any.
fn position_of(queue: &VecDeque<Request>, id: ThreadId) -> Option<usize> {
    queue.iter().position(|request| request.requester().id() == id)
}

/// Trigger the wake signal of every request in the granted batch.
///
/// Notification is idempotent, so entries that were already granted (and
/// already running) are unaffected; only entries whose grant status just
/// changed actually wake.
fn wake_granted(queue: &VecDeque<Request>) {
    for request in queue.iter().take(granted_len(queue)) {
        request.wake().notify();
    }
}

/// A shared/exclusive lock with FIFO fairness.
///
/// Multiple tasks may hold the lock in [`Mode::Share`] concurrently; a
/// [`Mode::Exclusive`] holder excludes everyone else. Grant order follows
/// queue position: a shared request enqueued behind a pending exclusive
/// request is never granted before it, which keeps writers from starving.
///
/// The lock is not re-entrant: a task holding it must not obtain it again.
#[derive(Debug)]
pub struct SELock {
    /// Pending and granted requests in arrival order.
    queue: Mutex<VecDeque<Request>>,

    /// Tick between liveness/deadline re-checks while a request waits.
    poll_interval: Duration,
}

impl SELock {
    /// Create a lock with the default poll interval.
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    /// Create a lock with a custom re-check cadence.
    ///
    /// The cadence bounds how quickly a waiter notices a dead owner or an
    /// expired deadline; grants themselves are signaled immediately.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            poll_interval,
        }
    }

    /// Obtain the lock in shared (read) mode.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Maximum time to wait, or `None` to wait indefinitely
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The lock is held; pair with a later [`release`](Self::release)
    /// * `Err(SELockError::ObtainTimeout)` - The wait budget elapsed
    /// * `Err(SELockError::OwnerNotAlive)` - A blocking holder's task died
    pub fn obtain_share(&self, timeout: Option<Duration>) -> Result<()> {
        self.obtain(Mode::Share, timeout)
    }

    /// Obtain the lock in exclusive (write) mode.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Maximum time to wait, or `None` to wait indefinitely
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The lock is held; pair with a later [`release`](Self::release)
    /// * `Err(SELockError::ObtainTimeout)` - The wait budget elapsed
    /// * `Err(SELockError::OwnerNotAlive)` - A blocking holder's task died
    pub fn obtain_excl(&self, timeout: Option<Duration>) -> Result<()> {
        self.obtain(Mode::Exclusive, timeout)
    }

    /// Obtain the lock in the given mode.
    ///
    /// Generic entry point backing both [`obtain_share`](Self::obtain_share)
    /// and [`obtain_excl`](Self::obtain_excl), and the mode-parameterized
    /// scoped guard.
    pub fn obtain(&self, mode: Mode, timeout: Option<Duration>) -> Result<()> {
        let handle = TaskHandle::current();
        let deadline = timeout.map(|budget| Instant::now() + budget);

        let wake = {
            let mut queue = self.queue();
            let request = Request::new(handle.clone(), mode);
            let wake = request.wake();
            queue.push_back(request);
            let position = queue.len() - 1;
            if position < granted_len(&queue) {
                trace!(
                    "{} request granted immediately at position {}",
                    mode.as_str(),
                    position
                );
                return Ok(());
            }
            trace!("{} request waiting at position {}", mode.as_str(), position);
            wake
        };

        loop {
            // Sleep at most one tick (capped by the deadline) so liveness and
            // expiry keep getting re-checked even without a wake notification.
            let expired = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now < deadline {
                        wake.wait_for(self.poll_interval.min(deadline - now));
                        false
                    } else {
                        true
                    }
                }
                None => {
                    wake.wait_for(self.poll_interval);
                    false
                }
            };

            let mut queue = self.queue();
            let granted = granted_len(&queue);
            let Some(position) = position_of(&queue, handle.id()) else {
                // Only the owning task removes its own entry.
                unreachable!("request vanished from the queue while waiting");
            };

            if position < granted {
                trace!("{} request granted after wait", mode.as_str());
                return Ok(());
            }

            if queue
                .iter()
                .take(granted)
                .any(|request| !request.requester().is_alive())
            {
                let _ = queue.remove(position);
                wake_granted(&queue);
                warn!(
                    "{} request abandoned: a granted holder's task terminated \
                     without releasing",
                    mode.as_str()
                );
                return Err(SELockError::OwnerNotAlive);
            }

            if expired {
                let _ = queue.remove(position);
                wake_granted(&queue);
                trace!("{} request timed out at position {}", mode.as_str(), position);
                return Err(SELockError::ObtainTimeout);
            }
        }
    }

    /// Release the calling task's granted entry.
    ///
    /// Never blocks. The entry is removed from the queue, the granted batch
    /// is recomputed for the remainder, and every newly granted request is
    /// woken.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The entry was released
    /// * `Err(SELockError::Unowned)` - The calling task has no entry
    /// * `Err(SELockError::ReleasedByExclusiveWaiter)` - The task's exclusive
    ///   request is still waiting, not granted
    /// * `Err(SELockError::ReleasedBySharedWaiter)` - The task's shared
    ///   request is still waiting, not granted
    pub fn release(&self) -> Result<()> {
        let id = std::thread::current().id();
        let mut queue = self.queue();

        let Some(position) = position_of(&queue, id) else {
            return Err(SELockError::Unowned);
        };

        if position >= granted_len(&queue) {
            return Err(match queue[position].mode() {
                Mode::Exclusive => SELockError::ReleasedByExclusiveWaiter,
                Mode::Share => SELockError::ReleasedBySharedWaiter,
            });
        }

        let released = queue.remove(position);
        if let Some(request) = released {
            trace!("released {} lock", request.mode().as_str());
        }
        wake_granted(&queue);
        Ok(())
    }

    /// Current queue length: granted holders plus waiters.
    pub fn len(&self) -> usize {
        self.queue().len()
    }

    /// Whether no task currently holds or awaits the lock.
    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    /// Lock the queue, recovering from poisoning.
    ///
    /// Queue state stays consistent even if a holder panics: every mutation
    /// completes before the mutex is dropped.
    fn queue(&self) -> MutexGuard<'_, VecDeque<Request>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
impl SELock {
    /// Append a request for the calling task without blocking on it.
    ///
    /// Lets tests construct a queued-but-waiting entry owned by the test
    /// thread, which a blocking obtain cannot produce.
    pub(crate) fn enqueue_unchecked(&self, mode: Mode) {
        let mut queue = self.queue();
        queue.push_back(Request::new(TaskHandle::current(), mode));
        wake_granted(&queue);
    }
}

impl Default for SELock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SELock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELock()")
    }
}
