/*!
 * Fail-Fast Tests
 *
 * Each scenario runs in a child copy of this test binary. The child must
 * die from SIGABRT after writing the critical record; returning to the
 * caller in any way is a failure.
 */

use nix::errno::Errno;
use nix::sys::signal::Signal;
use server_common::core::platform::yield_thread;
use server_common::{TracedCondvar, TracedMutex, TracedRwLock};
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, Output};
use std::sync::Arc;
use std::thread;

const SCENARIO_ENV: &str = "SERVER_COMMON_FATAL_SCENARIO";

/// Entry point for the child process; a no-op in a normal test run
#[test]
fn fatal_child() {
    let Ok(scenario) = std::env::var(SCENARIO_ENV) else {
        return;
    };
    server_common::init_tracing();

    match scenario.as_str() {
        "mutex_lock_after_destroy" => {
            let mutex = TracedMutex::new("doomed", 0);
            mutex.destroy();
            let _guard = mutex.lock();
        }
        "mutex_relock" => {
            let mutex = TracedMutex::new("reentrant", 0);
            let _first = mutex.lock();
            let _second = mutex.lock();
        }
        "mutex_destroy_held" => {
            let mutex = Arc::new(TracedMutex::new("held", 0));
            let holder = {
                let mutex = mutex.clone();
                thread::spawn(move || {
                    let _guard = mutex.lock();
                    thread::park();
                })
            };
            while !mutex.is_locked() {
                yield_thread();
            }
            mutex.destroy();
            holder.thread().unpark();
        }
        "mutex_double_destroy" => {
            let mutex = TracedMutex::new("twice", ());
            mutex.destroy();
            mutex.destroy();
        }
        "rwlock_write_relock" => {
            let lock = TracedRwLock::new("exports", 0);
            let _w = lock.write();
            let _r = lock.read();
        }
        "rwlock_destroy_while_reading" => {
            let lock = TracedRwLock::new("readers", 0);
            let _r = lock.read();
            lock.destroy();
        }
        "condvar_destroy_with_waiter" => {
            let pair = Arc::new((TracedMutex::new("m", ()), TracedCondvar::new("waited_on")));
            {
                let pair = pair.clone();
                thread::spawn(move || {
                    let (mutex, cond) = &*pair;
                    let mut guard = mutex.lock();
                    loop {
                        cond.wait(&mut guard);
                    }
                });
            }
            while pair.1.waiter_count() == 0 {
                yield_thread();
            }
            pair.1.destroy();
        }
        "rwlock_write_after_own_read" => {
            let lock = TracedRwLock::new("upgrade", 0);
            let _r = lock.read();
            let _w = lock.write();
        }
        "condvar_wait_after_destroy" => {
            let mutex = TracedMutex::new("m", ());
            let cond = TracedCondvar::new("gone");
            cond.destroy();
            let mut guard = mutex.lock();
            cond.wait(&mut guard);
        }
        "mutex_destroyed_during_wait" => {
            let pair = Arc::new((TracedMutex::new("pulled", ()), TracedCondvar::new("cv")));
            {
                let pair = pair.clone();
                thread::spawn(move || {
                    let (mutex, cond) = &*pair;
                    let mut guard = mutex.lock();
                    loop {
                        cond.wait(&mut guard);
                    }
                });
            }
            let (mutex, cond) = &*pair;
            // Parked waiter: counted, and the mutex handed back
            while cond.waiter_count() == 0 || mutex.is_locked() {
                yield_thread();
            }
            mutex.destroy();
            cond.notify_all();
            loop {
                thread::park();
            }
        }
        other => panic!("unknown scenario {other}"),
    }

    panic!("scenario {scenario} returned to its caller");
}

fn run_child(scenario: &str) -> Output {
    let exe = std::env::current_exe().expect("test binary path");
    Command::new(exe)
        .args(["fatal_child", "--exact", "--nocapture", "--test-threads=1"])
        .env(SCENARIO_ENV, scenario)
        .env("RUST_LOG", "trace")
        .env("SERVER_TRACE_JSON", "1")
        .output()
        .expect("spawn child test process")
}

fn assert_aborted(scenario: &str, errno: Errno, needle: &str) -> String {
    let output = run_child(scenario);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    assert_eq!(
        output.status.signal(),
        Some(Signal::SIGABRT as i32),
        "child did not abort; status {:?}, stderr:\n{stderr}",
        output.status
    );
    assert!(
        stderr.contains(&format!("Error {}, {needle}", errno as i32)),
        "missing critical record for {needle:?} in:\n{stderr}"
    );
    assert!(stderr.contains(r#""level":"ERROR""#), "stderr:\n{stderr}");
    assert!(stderr.contains(r#""target":"rw_lock""#), "stderr:\n{stderr}");
    stderr
}

#[test]
fn test_lock_after_destroy_aborts_with_einval() {
    let stderr = assert_aborted("mutex_lock_after_destroy", Errno::EINVAL, "acquiring mutex");
    // The destroy itself succeeded and was traced first
    assert!(stderr.contains("Destroy mutex"));
    assert!(stderr.contains("(doomed) at tests/fatal_test.rs:"));
}

#[test]
fn test_relock_aborts_with_edeadlk() {
    assert_aborted("mutex_relock", Errno::EDEADLK, "acquiring mutex");
}

#[test]
fn test_destroy_held_mutex_aborts_with_ebusy() {
    assert_aborted("mutex_destroy_held", Errno::EBUSY, "Destroy mutex");
}

#[test]
fn test_double_destroy_aborts_with_einval() {
    assert_aborted("mutex_double_destroy", Errno::EINVAL, "Destroy mutex");
}

#[test]
fn test_rwlock_read_under_own_write_aborts() {
    assert_aborted("rwlock_write_relock", Errno::EDEADLK, "read locking");
}

#[test]
fn test_rwlock_destroy_while_reading_aborts() {
    assert_aborted("rwlock_destroy_while_reading", Errno::EBUSY, "Destroy rwlock");
}

#[test]
fn test_condvar_destroy_with_waiter_aborts() {
    assert_aborted("condvar_destroy_with_waiter", Errno::EBUSY, "Destroy cond");
}

#[test]
fn test_rwlock_write_under_own_read_aborts() {
    assert_aborted("rwlock_write_after_own_read", Errno::EDEADLK, "write locking");
}

#[test]
fn test_wait_on_destroyed_condvar_aborts() {
    assert_aborted("condvar_wait_after_destroy", Errno::EINVAL, "using cond");
}

#[test]
fn test_waking_on_destroyed_mutex_aborts() {
    let stderr = assert_aborted("mutex_destroyed_during_wait", Errno::EINVAL, "acquiring mutex");
    assert!(stderr.contains("(pulled) at tests/fatal_test.rs:"));
}
