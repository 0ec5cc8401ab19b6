/*!
 * Traced Read-Write Lock
 *
 * `parking_lot::RwLock` with traced init/lock/unlock/destroy.
 *
 * Reads use `read_recursive` so a thread may stack read locks the way
 * POSIX rwlocks allow, even with a writer queued.
 */

use super::identity::LockIdentity;
use super::owner::{self, NO_OWNER};
use super::report::{failed, traced, Operation, PrimitiveKind};
use crate::core::errors::SyncError;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::borrow::Cow;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Many-readers/single-writer lock with diagnostic tracing
///
/// Failure checks, each fatal:
///
/// - any operation after destroy (EINVAL)
/// - read or write lock by the thread holding the write lock (EDEADLK)
/// - write lock by a thread holding a read lock (EDEADLK)
/// - destroy while any guard is alive (EBUSY)
pub struct TracedRwLock<T: ?Sized> {
    identity: LockIdentity,
    writer: AtomicU64,
    destroyed: AtomicBool,
    inner: RwLock<T>,
}

impl<T> TracedRwLock<T> {
    /// Initialize an rwlock labelled `label`
    #[track_caller]
    pub fn new(label: impl Into<Cow<'static, str>>, value: T) -> Self {
        let lock = Self {
            identity: LockIdentity::new(label),
            writer: AtomicU64::new(NO_OWNER),
            destroyed: AtomicBool::new(false),
            inner: RwLock::new(value),
        };
        traced(
            Operation::Init,
            PrimitiveKind::RwLock,
            &lock.identity,
            Location::caller(),
        );
        lock
    }
}

impl<T: ?Sized> TracedRwLock<T> {
    #[inline]
    fn check_acquire(&self, kind: PrimitiveKind, site: &'static Location<'static>, me: u64) {
        if self.destroyed.load(Ordering::Acquire) {
            failed(Operation::Lock, kind, &self.identity, site, SyncError::Invalid);
        }
        if self.writer.load(Ordering::Relaxed) == me {
            failed(Operation::Lock, kind, &self.identity, site, SyncError::Deadlock);
        }
    }

    /// Acquire shared read access
    #[track_caller]
    pub fn read(&self) -> TracedReadGuard<'_, T> {
        const KIND: PrimitiveKind = PrimitiveKind::RwLockRead;
        let site = Location::caller();
        self.check_acquire(KIND, site, owner::current());

        let guard = self.inner.read_recursive();
        if self.destroyed.load(Ordering::Acquire) {
            drop(guard);
            failed(Operation::Lock, KIND, &self.identity, site, SyncError::Invalid);
        }
        owner::hold_read(self.identity.handle());
        traced(Operation::Lock, KIND, &self.identity, site);

        TracedReadGuard {
            lock: self,
            guard: ManuallyDrop::new(guard),
            site,
        }
    }

    /// Acquire exclusive write access
    #[track_caller]
    pub fn write(&self) -> TracedWriteGuard<'_, T> {
        const KIND: PrimitiveKind = PrimitiveKind::RwLockWrite;
        let site = Location::caller();
        let me = owner::current();
        self.check_acquire(KIND, site, me);
        // Upgrading in place would wait on our own read lock forever
        if owner::holds_read(self.identity.handle()) {
            failed(Operation::Lock, KIND, &self.identity, site, SyncError::Deadlock);
        }

        let guard = self.inner.write();
        if self.destroyed.load(Ordering::Acquire) {
            drop(guard);
            failed(Operation::Lock, KIND, &self.identity, site, SyncError::Invalid);
        }
        self.writer.store(me, Ordering::Relaxed);
        traced(Operation::Lock, KIND, &self.identity, site);

        TracedWriteGuard {
            lock: self,
            guard: ManuallyDrop::new(guard),
            site,
        }
    }

    /// Destroy the rwlock; later operations on it are fatal
    #[track_caller]
    pub fn destroy(&self) {
        const KIND: PrimitiveKind = PrimitiveKind::RwLock;
        let site = Location::caller();

        if self.destroyed.load(Ordering::Acquire) {
            failed(Operation::Destroy, KIND, &self.identity, site, SyncError::Invalid);
        }

        let Some(guard) = self.inner.try_write() else {
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

    /// Whether a writer holds the lock right now (racy, diagnostics only)
    #[inline]
    pub fn is_locked_exclusive(&self) -> bool {
        self.inner.is_locked_exclusive()
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

impl<T: ?Sized> Drop for TracedRwLock<T> {
    fn drop(&mut self) {
        if !*self.destroyed.get_mut() {
            *self.destroyed.get_mut() = true;
            traced(
                Operation::Destroy,
                PrimitiveKind::RwLock,
                &self.identity,
                self.identity.declared_at(),
            );
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for TracedRwLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedRwLock")
            .field("identity", &self.identity)
            .field("destroyed", &self.is_destroyed())
            .field("inner", &&self.inner)
            .finish()
    }
}

/// Shared guard for [`TracedRwLock`]
#[must_use = "if unused the lock is released immediately"]
pub struct TracedReadGuard<'a, T: ?Sized> {
    lock: &'a TracedRwLock<T>,
    guard: ManuallyDrop<RwLockReadGuard<'a, T>>,
    site: &'static Location<'static>,
}

impl<T: ?Sized> TracedReadGuard<'_, T> {
    /// Release the read lock, attributing the release to the caller
    #[track_caller]
    pub fn unlock(mut guard: Self) {
        guard.site = Location::caller();
        drop(guard);
    }
}

impl<T: ?Sized> Deref for TracedReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T: ?Sized> Drop for TracedReadGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: dropped exactly once, here
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        owner::release_read(self.lock.identity.handle());
        traced(
            Operation::Unlock,
            PrimitiveKind::RwLockRead,
            &self.lock.identity,
            self.site,
        );
    }
}

/// Exclusive guard for [`TracedRwLock`]
#[must_use = "if unused the lock is released immediately"]
pub struct TracedWriteGuard<'a, T: ?Sized> {
    lock: &'a TracedRwLock<T>,
    guard: ManuallyDrop<RwLockWriteGuard<'a, T>>,
    site: &'static Location<'static>,
}

impl<T: ?Sized> TracedWriteGuard<'_, T> {
    /// Release the write lock, attributing the release to the caller
    #[track_caller]
    pub fn unlock(mut guard: Self) {
        guard.site = Location::caller();
        drop(guard);
    }
}

impl<T: ?Sized> Deref for TracedWriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T: ?Sized> DerefMut for TracedWriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: ?Sized> Drop for TracedWriteGuard<'_, T> {
    fn drop(&mut self) {
        const KIND: PrimitiveKind = PrimitiveKind::RwLockWrite;
        let lock = self.lock;
        if lock.writer.load(Ordering::Relaxed) != owner::current() {
            failed(Operation::Unlock, KIND, &lock.identity, self.site, SyncError::NotOwner);
        }
        lock.writer.store(NO_OWNER, Ordering::Relaxed);

        // SAFETY: dropped exactly once, here
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        traced(Operation::Unlock, KIND, &lock.identity, self.site);
    }
}
