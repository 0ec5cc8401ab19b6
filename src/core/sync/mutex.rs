/*!
 * Traced Mutex
 *
 * `parking_lot::Mutex` with every init/lock/unlock/destroy traced and any
 * failure turned into a process abort.
 */

use super::identity::LockIdentity;
use super::owner::{self, NO_OWNER};
use super::report::{failed, traced, Operation, PrimitiveKind};
use crate::core::errors::SyncError;
use parking_lot::{Mutex, MutexGuard};
use std::borrow::Cow;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

const KIND: PrimitiveKind = PrimitiveKind::Mutex;

/// Mutual-exclusion lock with diagnostic tracing
///
/// Behaves exactly like `parking_lot::Mutex` apart from the failure checks
/// an error-checking pthread mutex performs. A failed check aborts the
/// process after logging:
///
/// - lock or destroy after destroy (EINVAL)
/// - lock by the thread already holding it (EDEADLK)
/// - destroy while held (EBUSY)
///
/// # Example
///
/// ```
/// use server_common::TracedMutex;
///
/// let table = TracedMutex::new("lock_table", Vec::<u64>::new());
/// table.lock().push(7);
/// assert_eq!(table.lock().len(), 1);
/// table.destroy();
/// ```
pub struct TracedMutex<T: ?Sized> {
    identity: LockIdentity,
    owner: AtomicU64,
    destroyed: AtomicBool,
    inner: Mutex<T>,
}

impl<T> TracedMutex<T> {
    /// Initialize a mutex labelled `label`
    #[track_caller]
    pub fn new(label: impl Into<Cow<'static, str>>, value: T) -> Self {
        let mutex = Self {
            identity: LockIdentity::new(label),
            owner: AtomicU64::new(NO_OWNER),
            destroyed: AtomicBool::new(false),
            inner: Mutex::new(value),
        };
        traced(Operation::Init, KIND, &mutex.identity, Location::caller());
        mutex
    }
}

impl<T: ?Sized> TracedMutex<T> {
    /// Acquire the mutex, blocking until it is available
    #[track_caller]
    pub fn lock(&self) -> TracedMutexGuard<'_, T> {
        let site = Location::caller();
        let me = owner::current();

        if self.destroyed.load(Ordering::Acquire) {
            failed(Operation::Lock, KIND, &self.identity, site, SyncError::Invalid);
        }
        if self.owner.load(Ordering::Relaxed) == me {
            failed(Operation::Lock, KIND, &self.identity, site, SyncError::Deadlock);
        }

        let guard = self.inner.lock();
        // Destroyed while we were blocked
        if self.destroyed.load(Ordering::Acquire) {
            drop(guard);
            failed(Operation::Lock, KIND, &self.identity, site, SyncError::Invalid);
        }
        self.owner.store(me, Ordering::Relaxed);
        traced(Operation::Lock, KIND, &self.identity, site);

        TracedMutexGuard {
            mutex: self,
            guard: ManuallyDrop::new(guard),
            site,
        }
    }

    /// Destroy the mutex
    ///
    /// Any later operation on it is fatal. Dropping a mutex that was never
    /// destroyed destroys it implicitly.
    #[track_caller]
    pub fn destroy(&self) {
        let site = Location::caller();

        if self.destroyed.load(Ordering::Acquire) {
            failed(Operation::Destroy, KIND, &self.identity, site, SyncError::Invalid);
        }

        let Some(guard) = self.inner.try_lock() else {
            failed(Operation::Destroy, KIND, &self.identity, site, SyncError::Busy);
        };
        let already = self.destroyed.swap(true, Ordering::AcqRel);
        drop(guard);
        if already {
            failed(Operation::Destroy, KIND, &self.identity, site, SyncError::Invalid);
        }
        traced(Operation::Destroy, KIND, &self.identity, site);
    }

    #[inline]
    pub fn identity(&self) -> &LockIdentity {
        &self.identity
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Whether some thread holds the mutex right now (racy, diagnostics only)
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Mutable access without locking; the borrow proves exclusivity
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

impl<T: ?Sized> Drop for TracedMutex<T> {
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

impl<T: ?Sized + fmt::Debug> fmt::Debug for TracedMutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedMutex")
            .field("identity", &self.identity)
            .field("destroyed", &self.is_destroyed())
            .field("inner", &&self.inner)
            .finish()
    }
}

/// RAII guard for [`TracedMutex`]; releasing it is traced
///
/// An implicit release (drop) reports the acquire site. Use
/// [`TracedMutexGuard::unlock`] to report the release site instead.
#[must_use = "if unused the mutex is released immediately"]
pub struct TracedMutexGuard<'a, T: ?Sized> {
    pub(super) mutex: &'a TracedMutex<T>,
    pub(super) guard: ManuallyDrop<MutexGuard<'a, T>>,
    site: &'static Location<'static>,
}

impl<'a, T: ?Sized> TracedMutexGuard<'a, T> {
    /// Release the mutex, attributing the release to the caller
    #[track_caller]
    pub fn unlock(mut guard: Self) {
        guard.site = Location::caller();
        drop(guard);
    }

    /// The mutex this guard holds
    #[inline]
    pub fn mutex(guard: &Self) -> &'a TracedMutex<T> {
        guard.mutex
    }

    /// Hand ownership bookkeeping over around a condvar wait
    #[inline]
    pub(super) fn set_owner(guard: &Self, token: u64) {
        guard.mutex.owner.store(token, Ordering::Relaxed);
    }
}

impl<T: ?Sized> Deref for TracedMutexGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T: ?Sized> DerefMut for TracedMutexGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: ?Sized> Drop for TracedMutexGuard<'_, T> {
    fn drop(&mut self) {
        let mutex = self.mutex;
        if mutex.owner.load(Ordering::Relaxed) != owner::current() {
            failed(Operation::Unlock, KIND, &mutex.identity, self.site, SyncError::NotOwner);
        }
        mutex.owner.store(NO_OWNER, Ordering::Relaxed);

        // SAFETY: the guard is dropped exactly once, here, and never touched after
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        traced(Operation::Unlock, KIND, &mutex.identity, self.site);
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for TracedMutexGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
