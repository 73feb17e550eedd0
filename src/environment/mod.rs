//! Process environment setup for the build container.
//!
//! Runs before any action: fixes locale, terminal and shell variables,
//! makes sure the sentinel homes don't exist, and gives the build user the
//! numeric id the host asked for.

mod fast_io;
mod sentinel;

use std::env;

use tracing::{debug, info, warn};

use crate::config::{Config, RunOptions, SENTINEL_DIR};
use crate::identity::{self, BuildIdentity};
use crate::privilege;

pub use fast_io::{FastIoGuard, FAST_IO_LIBRARY, FAST_IO_LIBRARY_DIR};
pub use sentinel::{enforce_absent, Leftover};

/// Locale used when unicode output is enabled.
pub const UNICODE_LOCALE: &str = "C.UTF-8";
/// Locale used when unicode output is disabled.
pub const POSIX_LOCALE: &str = "C";

/// Prepare the environment of this process and its children.
///
/// Never fails: anything unexpected is logged as a warning. On the update
/// phase a missing build user is expected, since that phase creates it.
pub fn configure_environment(config: &Config, options: &RunOptions, is_update_phase: bool) {
    env::set_var(
        "LANG",
        if options.unicode {
            UNICODE_LOCALE
        } else {
            POSIX_LOCALE
        },
    );
    env::set_var(
        "TERM",
        if options.color {
            "xterm-256color"
        } else {
            "xterm-mono"
        },
    );
    env::set_var("SHELL", "/bin/sh");
    env::set_var("HOME", SENTINEL_DIR);
    env::remove_var("LOGNAME");

    for leftover in enforce_absent(&config.sentinel_dirs) {
        if leftover.writable {
            warn!(
                "Path {} exists, is writable and could not be removed: {}",
                leftover.path.display(),
                leftover.reason
            );
        } else {
            debug!(
                "Path {} exists but is read-only: {}",
                leftover.path.display(),
                leftover.reason
            );
        }
    }

    let Some(uid) = options.builder_uid.filter(|uid| *uid > 0) else {
        return;
    };
    if !privilege::is_privileged() {
        return;
    }

    match BuildIdentity::lookup(&config.build_user) {
        Ok(Some(builder)) => {
            if let Err(e) = identity::remap_uid(&builder, uid) {
                warn!("Unable to change UID of '{}' to {}: {:#}", builder.name, uid, e);
            }
        }
        Ok(None) if is_update_phase => {
            info!(
                "Build user '{}' does not exist yet, UID will be set on creation",
                config.build_user
            );
        }
        Ok(None) => {
            warn!(
                "Build user '{}' does not exist, can not set UID {}",
                config.build_user, uid
            );
        }
        Err(e) => warn!("Unable to look up build user: {:#}", e),
    }
}
