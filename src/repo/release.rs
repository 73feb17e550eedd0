//! Release manifest for the local repository.

use chrono::{DateTime, Utc};
use std::path::Path;

use super::digest::IndexDigest;
use super::INDEX_FILE;

/// Origin and label of the local repository.
pub const REPO_ORIGIN: &str = "dsrun-local";
/// The one component the local repository provides.
pub const REPO_COMPONENT: &str = "main";

/// Render the manifest declaring the index and its checksums.
pub fn render_release(digest: &IndexDigest, date: DateTime<Utc>) -> String {
    format!(
        "Origin: {origin}\n\
         Label: {origin}\n\
         Acquire-By-Hash: no\n\
         Components: {component}\n\
         Date: {date}\n\
         MD5Sum:\n \
         {md5} {size} {index}\n\
         SHA256:\n \
         {sha256} {size} {index}\n",
        origin = REPO_ORIGIN,
        component = REPO_COMPONENT,
        date = date.format("%a, %d %b %Y %H:%M:%S UTC"),
        md5 = digest.md5,
        sha256 = digest.sha256,
        size = digest.size,
        index = INDEX_FILE,
    )
}

/// Source list entry registering `dir` as a trusted flat repository.
pub fn source_line(dir: &Path) -> String {
    format!("deb [trusted=yes] file://{} ./", dir.display())
}
