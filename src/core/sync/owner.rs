/*!
 * Thread Ownership Tokens
 */

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Owner value meaning "nobody"
pub(super) const NO_OWNER: u64 = 0;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static TOKEN: u64 = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);

    /// Read locks held by this thread: (rwlock handle, depth)
    static READ_HOLDS: RefCell<Vec<(u64, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Nonzero token unique to the calling thread
#[inline]
pub(super) fn current() -> u64 {
    TOKEN.with(|t| *t)
}

/// Note a read lock taken by this thread on rwlock `handle`
pub(super) fn hold_read(handle: u64) {
    let _ = READ_HOLDS.try_with(|holds| {
        let mut holds = holds.borrow_mut();
        match holds.iter_mut().find(|(h, _)| *h == handle) {
            Some((_, depth)) => *depth += 1,
            None => holds.push((handle, 1)),
        }
    });
}

/// Note a read lock on rwlock `handle` released by this thread
pub(super) fn release_read(handle: u64) {
    let _ = READ_HOLDS.try_with(|holds| {
        let mut holds = holds.borrow_mut();
        if let Some(pos) = holds.iter().position(|(h, _)| *h == handle) {
            holds[pos].1 -= 1;
            if holds[pos].1 == 0 {
                holds.swap_remove(pos);
            }
        }
    });
}

/// Whether this thread holds a read lock on rwlock `handle`
pub(super) fn holds_read(handle: u64) -> bool {
    READ_HOLDS
        .try_with(|holds| holds.borrow().iter().any(|(h, _)| *h == handle))
        .unwrap_or(false)
}
