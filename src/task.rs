//! Task identity and liveness.
//!
//! `TaskHandle` is the only OS-coupling surface in the crate: the grant
//! engine compares handles by identity and asks whether the owning thread is
//! still running, nothing more.
//!
//! Liveness is observed through a thread-local sentinel: every thread that
//! touches the lock owns an `Arc<()>` in TLS, and each handle carries a
//! `Weak` to it. When the thread terminates its TLS destructor drops the
//! sentinel, so the `Weak` stops upgrading. TLS destructors run on the
//! exiting thread itself, which means the probe is already accurate by the
//! time a `join` on that thread returns.

use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

thread_local! {
    static ALIVE_SENTINEL: Arc<()> = Arc::new(());
}

/// Identity of a task that has requested the lock.
///
/// Comparable by thread id and queryable for liveness.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: ThreadId,
    alive: Weak<()>,
}

impl TaskHandle {
    /// Handle for the calling thread.
    pub fn current() -> Self {
        Self {
            id: thread::current().id(),
            alive: ALIVE_SENTINEL.with(Arc::downgrade),
        }
    }

    /// The underlying thread id.
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Whether the owning thread is still running.
    pub fn is_alive(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskHandle {}
