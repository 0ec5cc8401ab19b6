/*!
 * Error Types
 * Centralized error handling with thiserror and miette support
 */

use miette::Diagnostic;
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a synchronization primitive operation
///
/// Every variant maps onto the POSIX error code an error-checking pthread
/// primitive would return in the same situation. These never reach callers
/// as values: the sync layer logs them and aborts.
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum SyncError {
    #[error("primitive used after destroy")]
    #[diagnostic(
        code(sync::invalid),
        help("The primitive was destroyed earlier. Check the destroy call site in the logs.")
    )]
    Invalid,

    #[error("primitive is busy")]
    #[diagnostic(
        code(sync::busy),
        help("Destroy was attempted while the lock was held or threads were waiting.")
    )]
    Busy,

    #[error("calling thread already holds the lock")]
    #[diagnostic(
        code(sync::deadlock),
        help("Relocking a held lock from the same thread would never return.")
    )]
    Deadlock,

    #[error("calling thread does not hold the lock")]
    #[diagnostic(
        code(sync::not_owner),
        help("Locks must be released by the thread that acquired them.")
    )]
    NotOwner,
}

impl SyncError {
    /// POSIX error code for this failure
    #[inline]
    pub const fn errno(self) -> Errno {
        match self {
            Self::Invalid => Errno::EINVAL,
            Self::Busy => Errno::EBUSY,
            Self::Deadlock => Errno::EDEADLK,
            Self::NotOwner => Errno::EPERM,
        }
    }

    /// Numeric error code as logged in critical records
    #[inline]
    pub const fn code(self) -> i32 {
        self.errno() as i32
    }
}

/// Bounded buffer errors
///
/// The only recoverable failure in this crate. The destination buffer is
/// guaranteed untouched whenever one is returned.
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum BufferError {
    #[error("buffer overflow: {needed} bytes needed, {capacity} available")]
    #[diagnostic(
        code(buffer::overflow),
        help("Truncate the input or use a larger buffer.")
    )]
    Overflow {
        /// Bytes required including the terminator
        needed: usize,
        /// Bytes available including the terminator slot
        capacity: usize,
    },
}

/// Result type for bounded buffer operations
pub type BufferResult<T> = Result<T, BufferError>;
