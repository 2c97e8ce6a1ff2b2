//! selock: a shared/exclusive lock with FIFO fairness.
//!
//! [`SELock`] lets any number of tasks hold the lock in shared (read) mode
//! concurrently, or a single task hold it in exclusive (write) mode. Grant
//! order follows arrival order: requests queue up, and the granted batch is
//! always a prefix of the queue, so a pending writer is never starved by
//! later readers.
//!
//! # Features
//!
//! - Optional timeouts on acquisition ([`SELock::obtain_share`],
//!   [`SELock::obtain_excl`]).
//! - Dead-owner detection: a waiter fails with
//!   [`SELockError::OwnerNotAlive`] instead of hanging forever when the
//!   task blocking it has terminated without releasing.
//! - RAII guards ([`ScopedShare`], [`ScopedExclusive`], [`ScopedObtain`])
//!   that release on every exit path.
//!
//! # Example
//!
//! ```
//! use selock::{ScopedExclusive, ScopedShare, SELock};
//!
//! let lock = SELock::new();
//!
//! {
//!     let _guard = ScopedShare::new(&lock, None)?;
//!     // read the protected state...
//! } // released here
//!
//! {
//!     let _guard = ScopedExclusive::new(&lock, None)?;
//!     // mutate the protected state...
//! } // released here
//!
//! assert!(lock.is_empty());
//! # Ok::<(), selock::SELockError>(())
//! ```

pub mod error;
pub mod guard;
pub mod lock;
pub mod request;
pub mod task;


// Re-export the public API at the crate root.
pub use error::{Result, SELockError};
pub use guard::{ScopedExclusive, ScopedObtain, ScopedShare};
pub use lock::SELock;
pub use request::Mode;
pub use task::TaskHandle;
