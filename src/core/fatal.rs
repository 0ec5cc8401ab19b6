/*!
 * Fail-Fast Termination
 */

use std::io::Write;

/// Terminate the process after a critical record has been emitted
///
/// Flushes the standard streams first so the record written just before
/// is not lost, then aborts. Never unwinds, never returns.
#[cold]
#[inline(never)]
pub(crate) fn terminate() -> ! {
    let _ = std::io::stderr().flush();
    let _ = std::io::stdout().flush();
    std::process::abort()
}
