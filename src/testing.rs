//! Test support for code that changes process-wide state for good.

use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult};
use std::panic::{self, AssertUnwindSafe};

/// Account forked children switch to when the suite runs as root.
pub const UNPRIVILEGED_USER: &str = "nobody";

/// Run `f` in a forked child and return the child's exit code.
///
/// The child exits with whatever `f` returns, or 101 if it panics, so
/// assertions inside `f` surface as a non-zero code in the parent.
pub fn run_in_child<F: FnOnce() -> i32>(f: F) -> i32 {
    match unsafe { fork() }.expect("fork failed") {
        ForkResult::Child => {
            let code = panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or(101);
            std::process::exit(code);
        }
        ForkResult::Parent { child } => match waitpid(child, None).expect("waitpid failed") {
            WaitStatus::Exited(_, code) => code,
            other => panic!("child did not exit normally: {:?}", other),
        },
    }
}
