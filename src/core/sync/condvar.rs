/*!
 * Traced Condition Variable
 *
 * Init and destroy are traced. Waiting and notifying go straight to
 * `parking_lot::Condvar` with no records of their own.
 */

use super::identity::LockIdentity;
use super::mutex::TracedMutexGuard;
use super::owner::{self, NO_OWNER};
use super::report::{failed, traced, Operation, PrimitiveKind};
use crate::core::errors::SyncError;
use parking_lot::{Condvar, WaitTimeoutResult};
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

const KIND: PrimitiveKind = PrimitiveKind::Condvar;

/// Condition variable paired with [`TracedMutex`](super::TracedMutex)
///
/// Destroying it while threads are waiting is fatal (EBUSY), as is
/// destroying it twice (EINVAL).
pub struct TracedCondvar {
    identity: LockIdentity,
    waiters: AtomicUsize,
    destroyed: AtomicBool,
    inner: Condvar,
}

impl TracedCondvar {
    /// Initialize a condition variable labelled `label`
    #[track_caller]
    pub fn new(label: impl Into<Cow<'static, str>>) -> Self {
        let cond = Self {
            identity: LockIdentity::new(label),
            waiters: AtomicUsize::new(0),
            destroyed: AtomicBool::new(false),
            inner: Condvar::new(),
        };
        traced(Operation::Init, KIND, &cond.identity, Location::caller());
        cond
    }

    /// Destroy the condition variable
    #[track_caller]
    pub fn destroy(&self) {
        let site = Location::caller();

        if self.destroyed.load(Ordering::Acquire) {
            failed(Operation::Destroy, KIND, &self.identity, site, SyncError::Invalid);
        }
        if self.waiters.load(Ordering::Acquire) > 0 {
            failed(Operation::Destroy, KIND, &self.identity, site, SyncError::Busy);
        }
        if self.destroyed.swap(true, Ordering::AcqRel) {
            failed(Operation::Destroy, KIND, &self.identity, site, SyncError::Invalid);
        }
        traced(Operation::Destroy, KIND, &self.identity, site);
    }

    /// Block until notified, releasing the mutex while asleep
    ///
    /// Spurious wakeups are possible; wait in a predicate loop. Waiting on
    /// a destroyed condvar, or waking to find the mutex destroyed while it
    /// was released, is fatal (EINVAL).
    #[track_caller]
    pub fn wait<T: ?Sized>(&self, guard: &mut TracedMutexGuard<'_, T>) {
        let site = Location::caller();
        let me = self.enter(guard, site);
        self.inner.wait(&mut *guard.guard);
        self.leave(guard, me, site);
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`
    #[track_caller]
    pub fn wait_for<T: ?Sized>(
        &self,
        guard: &mut TracedMutexGuard<'_, T>,
        timeout: Duration,
    ) -> WaitTimeoutResult {
        let site = Location::caller();
        let me = self.enter(guard, site);
        let result = self.inner.wait_for(&mut *guard.guard, timeout);
        self.leave(guard, me, site);
        result
    }

    /// Wake one waiter; returns whether one was woken
    #[inline]
    pub fn notify_one(&self) -> bool {
        self.inner.notify_one()
    }

    /// Wake every waiter; returns how many were woken
    #[inline]
    pub fn notify_all(&self) -> usize {
        self.inner.notify_all()
    }

    /// Threads currently blocked in `wait`/`wait_for`
    #[inline]
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Acquire)
    }

    #[inline]
    pub fn identity(&self) -> &LockIdentity {
        &self.identity
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    // The mutex is released for the duration of the wait, so its owner
    // must read "nobody" until it is re-acquired.
    #[inline]
    fn enter<T: ?Sized>(
        &self,
        guard: &TracedMutexGuard<'_, T>,
        site: &'static Location<'static>,
    ) -> u64 {
        if self.destroyed.load(Ordering::Acquire) {
            failed(Operation::Lock, KIND, &self.identity, site, SyncError::Invalid);
        }
        self.waiters.fetch_add(1, Ordering::AcqRel);
        TracedMutexGuard::set_owner(guard, NO_OWNER);
        owner::current()
    }

    #[inline]
    fn leave<T: ?Sized>(
        &self,
        guard: &TracedMutexGuard<'_, T>,
        me: u64,
        site: &'static Location<'static>,
    ) {
        let mutex = TracedMutexGuard::mutex(guard);
        if mutex.is_destroyed() {
            failed(
                Operation::Lock,
                PrimitiveKind::Mutex,
                mutex.identity(),
                site,
                SyncError::Invalid,
            );
        }
        TracedMutexGuard::set_owner(guard, me);
        self.waiters.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Drop for TracedCondvar {
    fn drop(&mut self) {
        if !*self.destroyed.get_mut() {
            *self.destroyed.get_mut() = true;
            traced(
                Operation::Destroy,
                KIND,
                &self.identity,
                self.identity.declared_at(),
            );
        }
    }
}

impl fmt::Debug for TracedCondvar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedCondvar")
            .field("identity", &self.identity)
            .field("waiters", &self.waiter_count())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::TracedMutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_notify() {
        let pair = Arc::new((TracedMutex::new("ready", false), TracedCondvar::new("ready_cv")));
        let pair2 = pair.clone();

        let handle = thread::spawn(move || {
            let (mutex, cond) = &*pair2;
            *mutex.lock() = true;
            cond.notify_one();
        });

        let (mutex, cond) = &*pair;
        let mut ready = mutex.lock();
        while !*ready {
            cond.wait(&mut ready);
        }
        drop(ready);
        handle.join().unwrap();
        assert_eq!(cond.waiter_count(), 0);
    }

    #[test]
    fn test_wait_for_times_out() {
        let mutex = TracedMutex::new("idle", ());
        let cond = TracedCondvar::new("idle_cv");
        let mut guard = mutex.lock();
        let result = cond.wait_for(&mut guard, Duration::from_millis(20));
        assert!(result.timed_out());
        // Ownership restored after the wait: the guard still releases cleanly
        drop(guard);
        cond.destroy();
        mutex.destroy();
    }

    #[test]
    fn test_notify_without_waiters() {
        let cond = TracedCondvar::new("nobody");
        assert!(!cond.notify_one());
        assert_eq!(cond.notify_all(), 0);
    }
}
