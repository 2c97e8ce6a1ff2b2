//! RAII scoped-acquisition guards.
//!
//! Each guard obtains the lock on construction and guarantees a release on
//! every exit path: normal return, early return, or a propagated failure
//! inside the protected block. If construction fails nothing was acquired
//! and nothing is released. If the drop-time release fails, a warning is
//! logged but no panic occurs.

use crate::error::Result;
use crate::lock::SELock;
use crate::request::Mode;
use log::warn;
use std::marker::PhantomData;
use std::time::Duration;

/// Scoped acquisition in a caller-selected mode.
///
/// Equivalent to [`ScopedShare`] / [`ScopedExclusive`] with the mode chosen
/// by parameter rather than by type.
#[derive(Debug)]
pub struct ScopedObtain<'a> {
    lock: &'a SELock,
    mode: Mode,

    /// Whether the lock has been released manually.
    released: bool,

    /// Release is keyed on task identity, so the guard must stay on the
    /// obtaining thread.
    _not_send: PhantomData<*const ()>,
}

impl<'a> ScopedObtain<'a> {
    /// Obtain `lock` in `mode`, waiting at most `timeout`.
    ///
    /// # Returns
    ///
    /// * `Ok(ScopedObtain)` - The lock is held until the guard drops
    /// * `Err(SELockError::ObtainTimeout)` - The wait budget elapsed
    /// * `Err(SELockError::OwnerNotAlive)` - A blocking holder's task died
    pub fn new(lock: &'a SELock, mode: Mode, timeout: Option<Duration>) -> Result<Self> {
        lock.obtain(mode, timeout)?;
        Ok(Self {
            lock,
            mode,
            released: false,
            _not_send: PhantomData,
        })
    }

    /// The mode this guard was obtained in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The lock this guard holds.
    pub fn lock(&self) -> &SELock {
        self.lock
    }

    /// Manually release the lock.
    ///
    /// This is useful when you want to release before the guard goes out of
    /// scope, and want to handle errors explicitly instead of getting a
    /// drop-time warning.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.release()
    }
}

impl Drop for ScopedObtain<'_> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.lock.release()
        {
            warn!("failed to release {} lock on drop: {}", self.mode.as_str(), e);
        }
    }
}

/// Scoped shared (read) acquisition.
#[derive(Debug)]
pub struct ScopedShare<'a> {
    inner: ScopedObtain<'a>,
}

impl<'a> ScopedShare<'a> {
    /// Obtain `lock` in shared mode, waiting at most `timeout`.
    pub fn new(lock: &'a SELock, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            inner: ScopedObtain::new(lock, Mode::Share, timeout)?,
        })
    }

    /// The lock this guard holds.
    pub fn lock(&self) -> &SELock {
        self.inner.lock()
    }

    /// Manually release the lock, surfacing any error.
    pub fn release(self) -> Result<()> {
        self.inner.release()
    }
}

/// Scoped exclusive (write) acquisition.
#[derive(Debug)]
pub struct ScopedExclusive<'a> {
    inner: ScopedObtain<'a>,
}

impl<'a> ScopedExclusive<'a> {
    /// Obtain `lock` in exclusive mode, waiting at most `timeout`.
    pub fn new(lock: &'a SELock, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            inner: ScopedObtain::new(lock, Mode::Exclusive, timeout)?,
        })
    }

    /// The lock this guard holds.
    pub fn lock(&self) -> &SELock {
        self.inner.lock()
    }

    /// Manually release the lock, surfacing any error.
    pub fn release(self) -> Result<()> {
        self.inner.release()
    }
}
