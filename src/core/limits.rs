/*!
 * Time Constants
 *
 * Centralized unit conversions used by the timestamp arithmetic.
 * Grouped by unit so call sites never spell out magic numbers.
 */

use crate::build_bug_on;

// =============================================================================
// NANOSECOND CONVERSIONS
// =============================================================================

/// Nanoseconds in one second
pub const NS_PER_SEC: u64 = 1_000_000_000;

/// Nanoseconds in one millisecond
pub const NS_PER_MSEC: u64 = 1_000_000;

/// Nanoseconds in one microsecond
pub const NS_PER_USEC: u64 = 1_000;

// =============================================================================
// MILLISECOND CONVERSIONS
// =============================================================================

/// Milliseconds in one second
pub const MSEC_PER_SEC: u64 = 1_000;

// The sub-second component of a timestamp is stored as u32
build_bug_on!(NS_PER_SEC > u32::MAX as u64);
build_bug_on!(NS_PER_MSEC * MSEC_PER_SEC != NS_PER_SEC);
build_bug_on!(NS_PER_USEC * 1_000 != NS_PER_MSEC);
