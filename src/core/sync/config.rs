/*!
 * Synchronization Configuration
 *
 * Process-wide tracing knobs for the instrumented primitives
 */

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static CONFIG: OnceLock<SyncConfig> = OnceLock::new();

/// Tracing configuration for the sync layer
///
/// Only affects success records. Failures are always logged before the
/// process aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Emit a TRACE record for every successful operation
    pub trace_success: bool,
    /// Add the current thread name to every record
    pub include_thread: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            trace_success: true,
            include_thread: false,
        }
    }
}

impl SyncConfig {
    /// Configuration with success records turned off
    pub const fn quiet() -> Self {
        Self {
            trace_success: false,
            include_thread: false,
        }
    }

    /// Build from the environment
    ///
    /// Environment variables:
    /// - SERVER_SYNC_TRACE: `0`/`false` disables success records (default: on)
    /// - SERVER_SYNC_TRACE_THREAD: `1`/`true` adds thread names (default: off)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            trace_success: env_flag("SERVER_SYNC_TRACE").unwrap_or(defaults.trace_success),
            include_thread: env_flag("SERVER_SYNC_TRACE_THREAD")
                .unwrap_or(defaults.include_thread),
        }
    }

    /// Install as the process-wide configuration
    ///
    /// Fails, handing the value back, if a configuration is already in
    /// effect (explicitly installed or lazily read from the environment).
    pub fn install(self) -> Result<(), SyncConfig> {
        CONFIG.set(self)
    }

    /// Configuration in effect, read from the environment on first use
    #[inline]
    pub fn current() -> &'static SyncConfig {
        CONFIG.get_or_init(Self::from_env)
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
