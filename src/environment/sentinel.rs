//! Sentinel homes must stay absent.
//!
//! The build user's home points at a path that is expected not to exist,
//! so nothing a build writes there can leak between runs.

use std::fs;
use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};
use tracing::debug;

/// A sentinel path that is still present after cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leftover {
    pub path: PathBuf,
    /// Unprivileged code could store state here.
    pub writable: bool,
    pub reason: String,
}

/// Remove every sentinel path that exists.
///
/// Returns the paths that could not be removed; deciding how loudly to
/// complain about them is up to the caller.
pub fn enforce_absent(paths: &[PathBuf]) -> Vec<Leftover> {
    let mut remaining = Vec::new();

    for path in paths {
        let Ok(meta) = fs::symlink_metadata(path) else {
            continue;
        };

        let removed = if meta.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        match removed {
            Ok(()) => debug!("Removed unexpected path {}", path.display()),
            Err(e) => remaining.push(Leftover {
                path: path.clone(),
                writable: is_writable(path),
                reason: e.to_string(),
            }),
        }
    }

    remaining
}

fn is_writable(path: &Path) -> bool {
    access(path, AccessFlags::W_OK).is_ok()
}
