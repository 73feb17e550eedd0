//! Utilities for path checking and directory management.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Find the source tree below the build root.
///
/// The build root is expected to hold exactly one unpacked source
/// directory next to the source package files, so the first directory
/// (by name) wins and plain files are skipped.
pub fn first_subdir(build_dir: &Path) -> Result<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(build_dir)
        .with_context(|| format!("Failed to read {}", build_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    dirs.into_iter().next().ok_or_else(|| {
        Error::NoSourceTree {
            dir: build_dir.to_path_buf(),
        }
        .into()
    })
}

/// True if `path` is missing, not a directory, or has no entries.
pub fn is_empty_dir(path: &Path) -> bool {
    match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_subdir_skips_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("aaa_1.0.dsc"), "").unwrap();
        fs::create_dir(tmp.path().join("hello-1.0")).unwrap();

        assert_eq!(first_subdir(tmp.path()).unwrap(), tmp.path().join("hello-1.0"));
    }

    #[test]
    fn test_first_subdir_is_stable() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("b")).unwrap();
        fs::create_dir(tmp.path().join("a")).unwrap();

        assert_eq!(first_subdir(tmp.path()).unwrap(), tmp.path().join("a"));
        assert_eq!(first_subdir(tmp.path()).unwrap(), tmp.path().join("a"));
    }

    #[test]
    fn test_first_subdir_none() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("file"), "").unwrap();

        let err = first_subdir(tmp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoSourceTree { .. })
        ));
    }

    #[test]
    fn test_is_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(is_empty_dir(tmp.path()));
        assert!(is_empty_dir(&tmp.path().join("missing")));

        fs::write(tmp.path().join("foo.deb"), "").unwrap();
        assert!(!is_empty_dir(tmp.path()));
    }
}
