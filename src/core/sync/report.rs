/*!
 * Outcome Reporting
 *
 * Every wrapped operation ends here: a TRACE record on success, or an
 * ERROR record followed by process abort on failure.
 */

use super::config::SyncConfig;
use super::identity::LockIdentity;
use crate::core::errors::SyncError;
use crate::core::fatal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use tracing::{error, trace};

/// Component tag for all sync records
pub const TARGET: &str = "rw_lock";

/// Wrapped operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Init,
    Lock,
    Unlock,
    Destroy,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive, and for rwlock acquire/release the access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Mutex,
    /// Whole rwlock (init/destroy)
    #[serde(rename = "rwlock")]
    RwLock,
    #[serde(rename = "rwlock_read")]
    RwLockRead,
    #[serde(rename = "rwlock_write")]
    RwLockWrite,
    Condvar,
}

impl PrimitiveKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mutex => "mutex",
            Self::RwLock => "rwlock",
            Self::RwLockRead => "rwlock_read",
            Self::RwLockWrite => "rwlock_write",
            Self::Condvar => "condvar",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message wording: (success record, failure record)
fn phrases(op: Operation, kind: PrimitiveKind) -> (&'static str, &'static str) {
    use Operation::*;
    use PrimitiveKind::*;

    match (op, kind) {
        (Init, Mutex) => ("Init mutex", "Init mutex"),
        (Lock, Mutex) => ("Acquired mutex", "acquiring mutex"),
        (Unlock, Mutex) => ("Released mutex", "releasing mutex"),
        (Destroy, Mutex) => ("Destroy mutex", "Destroy mutex"),
        (Init, RwLock | RwLockRead | RwLockWrite) => ("Init rwlock", "Init rwlock"),
        (Lock, RwLockRead) => ("Got read lock on", "read locking"),
        (Lock, RwLockWrite | RwLock) => ("Got write lock on", "write locking"),
        (Unlock, RwLock | RwLockRead | RwLockWrite) => ("Unlocked", "unlocking"),
        (Destroy, RwLock | RwLockRead | RwLockWrite) => ("Destroy rwlock", "Destroy rwlock"),
        (Init, Condvar) => ("Init cond", "Init cond"),
        (Destroy, Condvar) => ("Destroy cond", "Destroy cond"),
        (Lock | Unlock, Condvar) => ("Used cond", "using cond"),
    }
}

fn thread_name() -> String {
    let thread = std::thread::current();
    thread
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("{:?}", thread.id()))
}

/// Record a successful operation
#[inline]
pub(super) fn traced(
    op: Operation,
    kind: PrimitiveKind,
    identity: &LockIdentity,
    site: &'static Location<'static>,
) {
    let config = SyncConfig::current();
    if !config.trace_success {
        return;
    }

    let thread = config.include_thread.then(thread_name);
    let (done, _) = phrases(op, kind);
    trace!(
        target: TARGET,
        op = op.as_str(),
        kind = kind.as_str(),
        handle = identity.handle(),
        name = identity.label(),
        declared = %identity.declared_at(),
        thread = thread.as_deref(),
        "{} {} at {}:{}",
        done,
        identity,
        site.file(),
        site.line()
    );
}

/// Record a failed operation and abort the process
#[cold]
#[inline(never)]
pub(super) fn failed(
    op: Operation,
    kind: PrimitiveKind,
    identity: &LockIdentity,
    site: &'static Location<'static>,
    err: SyncError,
) -> ! {
    let (_, doing) = phrases(op, kind);
    let thread = thread_name();
    error!(
        target: TARGET,
        op = op.as_str(),
        kind = kind.as_str(),
        code = err.code(),
        error = %err,
        handle = identity.handle(),
        name = identity.label(),
        declared = %identity.declared_at(),
        thread = thread.as_str(),
        "Error {}, {} {} at {}:{}",
        err.code(),
        doing,
        identity,
        site.file(),
        site.line()
    );
    fatal::terminate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrases_wording() {
        assert_eq!(
            phrases(Operation::Lock, PrimitiveKind::Mutex),
            ("Acquired mutex", "acquiring mutex")
        );
        assert_eq!(
            phrases(Operation::Lock, PrimitiveKind::RwLockWrite).0,
            "Got write lock on"
        );
        assert_eq!(
            phrases(Operation::Destroy, PrimitiveKind::RwLock).0,
            "Destroy rwlock"
        );
        assert_eq!(phrases(Operation::Init, PrimitiveKind::Condvar).0, "Init cond");
    }

    #[test]
    fn test_names() {
        assert_eq!(Operation::Unlock.to_string(), "unlock");
        assert_eq!(PrimitiveKind::RwLockRead.to_string(), "rwlock_read");
    }

    #[test]
    fn test_serde_names_match_records() {
        use PrimitiveKind::*;

        for kind in [Mutex, RwLock, RwLockRead, RwLockWrite, Condvar] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(serde_json::from_str::<PrimitiveKind>(&json).unwrap(), kind);
        }
        for op in [Operation::Init, Operation::Lock, Operation::Unlock, Operation::Destroy] {
            assert_eq!(serde_json::to_string(&op).unwrap(), format!("\"{}\"", op.as_str()));
        }
    }
}
