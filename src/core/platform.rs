/*!
 * Platform Compatibility
 *
 * Build-time substitutes for primitives that are missing or spelled
 * differently on some targets. Every branch is resolved by `cfg`; nothing
 * here probes the platform at runtime.
 */

use super::time::Timestamp;
use nix::errno::Errno;

/// Length of the NUL-terminated string in `s`, scanning at most `max` bytes
///
/// Equivalent of `strnlen`. A slice without a terminator in range reports
/// `min(max, s.len())`.
#[inline]
pub fn bounded_len(s: &[u8], max: usize) -> usize {
    let limit = s.len().min(max);
    s[..limit].iter().position(|&b| b == 0).unwrap_or(limit)
}

/// Copy as much of `src` as fits into `dest`, always terminating
///
/// Equivalent of `strlcpy`: returns the full length of `src` so callers can
/// detect truncation with `ret >= dest.len()`. An empty `dest` is left alone.
pub fn copy_truncating(dest: &mut [u8], src: &[u8]) -> usize {
    let src_len = bounded_len(src, src.len());
    if let Some(room) = dest.len().checked_sub(1) {
        let n = src_len.min(room);
        dest[..n].copy_from_slice(&src[..n]);
        dest[n] = 0;
    }
    src_len
}

/// Read the realtime (wall-clock) clock
#[cfg(not(target_vendor = "apple"))]
pub fn realtime_clock() -> Result<Timestamp, Errno> {
    use nix::time::{clock_gettime, ClockId};

    let ts = clock_gettime(ClockId::CLOCK_REALTIME)?;
    Ok(Timestamp::new(ts.tv_sec() as i64, ts.tv_nsec() as u32))
}

/// Read the realtime (wall-clock) clock
///
/// Apple targets go through `SystemTime` instead of `clock_gettime`.
#[cfg(target_vendor = "apple")]
pub fn realtime_clock() -> Result<Timestamp, Errno> {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(Timestamp::from)
        .map_err(|_| Errno::EINVAL)
}

/// Give up the rest of the current time slice
#[cfg(not(target_vendor = "apple"))]
#[inline]
pub fn yield_thread() {
    if nix::sched::sched_yield().is_err() {
        std::thread::yield_now();
    }
}

/// Give up the rest of the current time slice
#[cfg(target_vendor = "apple")]
#[inline]
pub fn yield_thread() {
    std::thread::yield_now();
}
