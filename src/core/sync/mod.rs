/*!
 * Instrumented Synchronization Primitives
 *
 * Mutex, rwlock and condvar wrappers that trace every lifecycle operation
 * and treat any primitive failure as a fatal invariant violation.
 *
 * # Architecture
 *
 * Each wrapper owns a `parking_lot` primitive plus the bookkeeping needed
 * to detect what an error-checking pthread primitive would reject. Every
 * operation funnels its outcome through one reporting point:
 *
 * - **Success**: TRACE record on target `rw_lock` with the operation,
 *   primitive kind, identity (`#handle (label)`) and call site
 * - **Failure**: ERROR record with the numeric error code and the same
 *   context, then `abort()`
 *
 * No retry, no error return. A lock that misbehaves means some invariant is
 * already broken, and continuing would run on unverified state.
 *
 * # Concurrency
 *
 * Blocking and ordering are exactly those of the wrapped primitive. The
 * wrappers add no queuing, backoff or timeouts of their own.
 */

mod condvar;
mod config;
mod identity;
mod mutex;
mod owner;
mod report;
mod rwlock;

pub use condvar::TracedCondvar;
pub use config::SyncConfig;
pub use identity::LockIdentity;
pub use mutex::{TracedMutex, TracedMutexGuard};
pub use report::{Operation, PrimitiveKind, TARGET};
pub use rwlock::{TracedReadGuard, TracedRwLock, TracedWriteGuard};
