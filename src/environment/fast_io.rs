//! Scoped fast-I/O mode for package transactions.
//!
//! Preloads libeatmydata so fsync and friends become no-ops for the
//! package manager and everything it spawns. The container is thrown away
//! after use, so durability buys nothing there. Until the library is
//! installed (first initialize of a fresh image) the mode stays off.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use tracing::debug;

/// Library preloaded to turn durability syscalls into no-ops.
pub const FAST_IO_LIBRARY: &str = "libeatmydata.so";
/// Directory the preloaded library lives in.
pub const FAST_IO_LIBRARY_DIR: &str = "/usr/lib/libeatmydata";

/// Holds the fast-I/O override while alive.
///
/// Dropping the guard restores both variables to exactly what they were
/// before, including being unset. This also happens when a phase bails out
/// with an error, so the override never leaks into later phases.
#[must_use = "the override is removed as soon as the guard is dropped"]
pub struct FastIoGuard {
    saved: Vec<(&'static str, Option<OsString>)>,
}

impl FastIoGuard {
    /// Enable fast I/O using the library in `library_dir`.
    ///
    /// Returns an inactive guard, leaving the environment alone, when the
    /// library isn't there.
    pub fn acquire(library_dir: &Path) -> Self {
        if !library_dir.join(FAST_IO_LIBRARY).is_file() {
            debug!(
                "{} not found in {}, fast I/O mode disabled",
                FAST_IO_LIBRARY,
                library_dir.display()
            );
            return Self { saved: Vec::new() };
        }

        let saved = vec![
            ("LD_LIBRARY_PATH", env::var_os("LD_LIBRARY_PATH")),
            ("LD_PRELOAD", env::var_os("LD_PRELOAD")),
        ];

        env::set_var(
            "LD_LIBRARY_PATH",
            extend(env::var_os("LD_LIBRARY_PATH"), ":", library_dir.as_os_str()),
        );
        env::set_var(
            "LD_PRELOAD",
            extend(env::var_os("LD_PRELOAD"), " ", FAST_IO_LIBRARY),
        );
        debug!("Fast I/O mode enabled");

        Self { saved }
    }

    pub fn is_active(&self) -> bool {
        !self.saved.is_empty()
    }
}

impl Drop for FastIoGuard {
    fn drop(&mut self) {
        if !self.is_active() {
            return;
        }
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
        debug!("Fast I/O mode disabled");
    }
}

fn extend(current: Option<OsString>, separator: &str, item: impl AsRef<OsStr>) -> OsString {
    match current {
        Some(mut value) if !value.is_empty() => {
            value.push(separator);
            value.push(item);
            value
        }
        _ => item.as_ref().to_os_string(),
    }
}
