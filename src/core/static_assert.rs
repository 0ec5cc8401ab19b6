/*!
 * Compile-Time Assertions
 *
 * Break the build when a structural assumption stops holding.
 */

/// Fail compilation if `condition` evaluates to `true`.
///
/// The condition must be a constant boolean expression. It is evaluated in
/// a `const` item, so a true condition is a hard compile error rather than
/// a runtime panic.
///
/// # Example
///
/// ```
/// use server_common::build_bug_on;
///
/// build_bug_on!(std::mem::size_of::<u64>() != 8);
/// ```
///
/// ```compile_fail
/// use server_common::build_bug_on;
///
/// build_bug_on!(1 + 1 == 2);
/// ```
#[macro_export]
macro_rules! build_bug_on {
    ($condition:expr $(,)?) => {
        const _: () = ::core::assert!(
            !($condition),
            concat!("build_bug_on: ", stringify!($condition))
        );
    };
}
