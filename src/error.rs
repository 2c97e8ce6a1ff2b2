//! Error types for the selock crate.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use thiserror::Error;

/// Failure conditions surfaced by [`SELock`](crate::SELock) operations.
///
/// This is a closed taxonomy: `ObtainTimeout` is the only failure expected
/// under normal contention. `OwnerNotAlive` signals a crash or bug in a peer
/// task, and the three release variants are programmer errors. None of them
/// are retried internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SELockError {
    /// The caller-specified wait budget elapsed before the lock was granted.
    /// The request has already been dequeued; the caller holds nothing.
    #[error("timed out waiting for the lock")]
    ObtainTimeout,

    /// A task in the granted batch terminated without releasing, so the
    /// waiter could never be granted. The caller holds nothing.
    #[error("a task holding the lock terminated without releasing it")]
    OwnerNotAlive,

    /// The calling task attempted a release without ever obtaining the lock.
    #[error("attempted to release a lock this task never obtained")]
    Unowned,

    /// The calling task attempted a release while its exclusive request was
    /// still waiting, not yet granted.
    #[error("attempted to release while still waiting for exclusive access")]
    ReleasedByExclusiveWaiter,

    /// The calling task attempted a release while its shared request was
    /// still waiting, not yet granted.
    #[error("attempted to release while still waiting for shared access")]
    ReleasedBySharedWaiter,
}

/// Result type alias for selock operations.
pub type Result<T> = std::result::Result<T, SELockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        assert_eq!(
            SELockError::ObtainTimeout.to_string(),
            "timed out waiting for the lock"
        );
        assert_eq!(
            SELockError::Unowned.to_string(),
            "attempted to release a lock this task never obtained"
        );
        assert_eq!(
            SELockError::OwnerNotAlive.to_string(),
            "a task holding the lock terminated without releasing it"
        );
    }

    #[test]
    fn release_variants_name_the_waiting_mode() {
        assert!(
            SELockError::ReleasedByExclusiveWaiter
                .to_string()
                .contains("exclusive")
        );
        assert!(
            SELockError::ReleasedBySharedWaiter
                .to_string()
                .contains("shared")
        );
    }
}
