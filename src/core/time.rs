/*!
 * Timestamp Arithmetic
 *
 * Nanosecond-precision math on (seconds, nanoseconds) pairs.
 *
 * `NsecsElapsed` is the compact form: a plain nanosecond count that is a
 * duration or an offset from the epoch depending on where it came from.
 * `Timestamp` is the split form and keeps `nanos` in `[0, NS_PER_SEC)`
 * after every operation.
 */

use super::fatal;
use super::limits::NS_PER_SEC;
use super::platform;
use nix::errno::Errno;
use crate::build_bug_on;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;
use tracing::error;

/// Elapsed time in nanoseconds
pub type NsecsElapsed = u64;

const NS_PER_SEC_U32: u32 = NS_PER_SEC as u32;

/// Seconds and nanoseconds since the Unix epoch
///
/// Field order gives the derived `Ord` the right total order: seconds
/// first, then nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawTimestamp")]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

/// Wire form; normalized on the way in
#[derive(Deserialize)]
struct RawTimestamp {
    secs: i64,
    nanos: u32,
}

impl From<RawTimestamp> for Timestamp {
    fn from(raw: RawTimestamp) -> Self {
        Self::new(raw.secs, raw.nanos)
    }
}

build_bug_on!(std::mem::size_of::<Timestamp>() != 16);

impl Timestamp {
    /// The epoch itself
    pub const ZERO: Self = Self { secs: 0, nanos: 0 };

    /// Create a timestamp, carrying whole seconds out of `nanos`
    #[inline]
    pub const fn new(secs: i64, nanos: u32) -> Self {
        Self {
            secs: secs.wrapping_add((nanos / NS_PER_SEC_U32) as i64),
            nanos: nanos % NS_PER_SEC_U32,
        }
    }

    /// Split a nanosecond count into seconds and nanoseconds
    #[inline]
    pub const fn from_nsecs(interval: NsecsElapsed) -> Self {
        Self {
            secs: (interval / NS_PER_SEC) as i64,
            nanos: (interval % NS_PER_SEC) as u32,
        }
    }

    /// Collapse into a nanosecond count
    ///
    /// Good for wall-clock times until 2554. Times before the epoch wrap.
    #[inline]
    pub const fn to_nsecs(&self) -> NsecsElapsed {
        (self.secs as u64)
            .wrapping_mul(NS_PER_SEC)
            .wrapping_add(self.nanos as u64)
    }

    #[inline(always)]
    pub const fn secs(&self) -> i64 {
        self.secs
    }

    #[inline(always)]
    pub const fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Add an interval
    pub fn add_nsecs(&mut self, interval: NsecsElapsed) {
        let iv = Self::from_nsecs(interval);
        self.secs = self.secs.wrapping_add(iv.secs);

        // Both operands are below NS_PER_SEC, so the sum fits in u32
        let nanos = self.nanos + iv.nanos;
        if nanos >= NS_PER_SEC_U32 {
            self.secs = self.secs.wrapping_add(1);
            self.nanos = nanos - NS_PER_SEC_U32;
        } else {
            self.nanos = nanos;
        }
    }

    /// Subtract an interval, borrowing a second when the nanoseconds underflow
    pub fn sub_nsecs(&mut self, interval: NsecsElapsed) {
        let iv = Self::from_nsecs(interval);

        if iv.nanos > self.nanos {
            self.secs = self.secs.wrapping_sub(iv.secs + 1);
            self.nanos = self.nanos + NS_PER_SEC_U32 - iv.nanos;
        } else {
            self.secs = self.secs.wrapping_sub(iv.secs);
            self.nanos -= iv.nanos;
        }
    }

    /// Value-returning form of [`add_nsecs`](Self::add_nsecs)
    #[inline]
    #[must_use]
    pub fn plus_nsecs(mut self, interval: NsecsElapsed) -> Self {
        self.add_nsecs(interval);
        self
    }

    /// Value-returning form of [`sub_nsecs`](Self::sub_nsecs)
    #[inline]
    #[must_use]
    pub fn minus_nsecs(mut self, interval: NsecsElapsed) -> Self {
        self.sub_nsecs(interval);
        self
    }

    /// Convert to a `Duration` since the epoch; `None` before the epoch
    pub fn as_duration(&self) -> Option<Duration> {
        u64::try_from(self.secs)
            .ok()
            .map(|secs| Duration::new(secs, self.nanos))
    }

    #[inline]
    fn total_nanos(&self) -> i128 {
        i128::from(self.secs) * i128::from(NS_PER_SEC) + i128::from(self.nanos)
    }
}

impl From<Duration> for Timestamp {
    fn from(d: Duration) -> Self {
        Self {
            secs: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            nanos: d.subsec_nanos(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// Absolute distance between two timestamps, in either order
///
/// Saturates at `u64::MAX` for spans longer than ~584 years.
pub fn diff(start: &Timestamp, end: &Timestamp) -> NsecsElapsed {
    let span = (end.total_nanos() - start.total_nanos()).unsigned_abs();
    u64::try_from(span).unwrap_or(u64::MAX)
}

/// Order two timestamps: seconds first, then nanoseconds
#[inline]
pub fn time_cmp(t1: &Timestamp, t2: &Timestamp) -> Ordering {
    t1.secs
        .cmp(&t2.secs)
        .then_with(|| t1.nanos.cmp(&t2.nanos))
}

/// Current wall-clock time
///
/// A server that cannot read the clock cannot schedule anything safely, so
/// a failed read is fatal.
pub fn now() -> Timestamp {
    clock_or_die(platform::realtime_clock())
}

fn clock_or_die(reading: Result<Timestamp, Errno>) -> Timestamp {
    match reading {
        Ok(ts) => ts,
        Err(errno) => {
            error!(target: "main", errno = errno as i32, "Failed to get timestamp");
            fatal::terminate()
        }
    }
}
