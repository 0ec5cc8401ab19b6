/*!
 * Core Module
 * Synchronization wrappers, time arithmetic and bounded buffers
 */

pub mod buffer;
pub mod errors;
mod fatal;
pub mod limits;
pub mod platform;
pub mod static_assert;
pub mod sync;
pub mod time;

// Re-export for convenience
pub use buffer::{concat_bounded, copy_bounded, BoundedBuf};
pub use errors::*;
pub use sync::{
    LockIdentity, SyncConfig, TracedCondvar, TracedMutex, TracedMutexGuard, TracedReadGuard,
    TracedRwLock, TracedWriteGuard,
};
pub use time::{diff, now, time_cmp, NsecsElapsed, Timestamp};
