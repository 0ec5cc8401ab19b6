/*!
 * Lock Identity
 *
 * The (handle, label, declaration site) triple every traced primitive
 * carries for its diagnostics.
 */

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Diagnostic identity of a synchronization primitive
///
/// The handle is a process-unique number assigned at init. It stays the
/// same when the primitive is moved, unlike its address. None of the three
/// parts influence locking behaviour.
#[derive(Debug, Clone)]
pub struct LockIdentity {
    handle: u64,
    label: Cow<'static, str>,
    declared_at: &'static Location<'static>,
}

impl LockIdentity {
    /// Allocate a new identity declared at the caller's location
    #[track_caller]
    pub(crate) fn new(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            handle: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
            declared_at: Location::caller(),
        }
    }

    #[inline(always)]
    pub fn handle(&self) -> u64 {
        self.handle
    }

    #[inline(always)]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Where the primitive was initialized
    #[inline(always)]
    pub fn declared_at(&self) -> &'static Location<'static> {
        self.declared_at
    }
}

impl fmt::Display for LockIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.handle, self.label)
    }
}
