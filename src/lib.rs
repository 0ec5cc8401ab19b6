/*!
 * Server Common Library
 * Instrumented locking, timestamp arithmetic and bounded buffers shared
 * by the server and its tools
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{BufferError, BufferResult, SyncError};
pub use crate::core::{
    concat_bounded, copy_bounded, diff, now, time_cmp, BoundedBuf, LockIdentity, NsecsElapsed,
    SyncConfig, Timestamp, TracedCondvar, TracedMutex, TracedMutexGuard, TracedReadGuard,
    TracedRwLock, TracedWriteGuard,
};
pub use monitoring::{init_tracing, try_init_tracing};
