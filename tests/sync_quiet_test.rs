/*!
 * Quiet Configuration Tests
 *
 * Runs as its own binary: the installed configuration is process-wide.
 */

mod common;

use common::{capture, sync_messages};
use pretty_assertions::assert_eq;
use serial_test::serial;
use server_common::{SyncConfig, TracedCondvar, TracedMutex, TracedRwLock};

fn install_quiet() {
    // Every test installs the same value; later calls just see it in place
    let _ = SyncConfig::quiet().install();
    assert_eq!(*SyncConfig::current(), SyncConfig::quiet());
}

#[test]
fn test_quiet_suppresses_success_records() {
    install_quiet();

    let (_, records) = capture(|| {
        let mutex = TracedMutex::new("silent", 0);
        *mutex.lock() += 1;
        let lock = TracedRwLock::new("silent_rw", ());
        drop(lock.read());
        drop(lock.write());
        let cond = TracedCondvar::new("silent_cv");
        cond.notify_all();
        mutex.destroy();
    });

    assert!(sync_messages(&records).is_empty());
}

#[test]
#[serial]
fn test_from_env_flags() {
    std::env::set_var("SERVER_SYNC_TRACE", "off");
    std::env::set_var("SERVER_SYNC_TRACE_THREAD", "yes");
    let config = SyncConfig::from_env();
    assert!(!config.trace_success);
    assert!(config.include_thread);

    std::env::remove_var("SERVER_SYNC_TRACE");
    std::env::remove_var("SERVER_SYNC_TRACE_THREAD");
}

#[test]
#[serial]
fn test_from_env_ignores_garbage() {
    std::env::set_var("SERVER_SYNC_TRACE", "sometimes");
    assert_eq!(SyncConfig::from_env(), SyncConfig::default());
    std::env::remove_var("SERVER_SYNC_TRACE");
}
