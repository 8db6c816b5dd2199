use std::fmt;

/// Why a guarded mount never produced a value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MountError<E: fmt::Display> {
    /// The operation resolved to `Err` while the owner was still mounted.
    #[error("async operation rejected: {0}")]
    Rejected(E),
    /// The operation could not be queued on an executor.
    #[error("async operation was never started: {0}")]
    Spawn(String),
}
