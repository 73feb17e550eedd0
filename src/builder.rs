//! Package build step.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::common::first_subdir;
use crate::process::Cmd;

/// Build the source tree under `build_dir` with `build_tool`.
///
/// Expects privileges to be dropped already. A non-zero exit of the build
/// tool is returned as an error carrying the same exit code.
pub fn build_package(
    build_tool: &str,
    build_dir: &Path,
    build_flags: &[String],
    suite: Option<&str>,
) -> Result<PathBuf> {
    let source_dir = first_subdir(build_dir)?;
    info!("Building package in {}", source_dir.display());

    Cmd::new(build_tool)
        .args(build_args(build_flags, suite))
        .dir(&source_dir)
        .run_interactive()?;

    Ok(source_dir)
}

/// Arguments for the build tool: the changes override first, then the
/// caller's flags in order.
pub fn build_args(build_flags: &[String], suite: Option<&str>) -> Vec<String> {
    let mut args = Vec::with_capacity(build_flags.len() + 1);
    if let Some(suite) = suite.filter(|s| !s.is_empty()) {
        args.push(format!("--changes-option=-DDistribution={}", suite));
    }
    args.extend(build_flags.iter().cloned());
    args
}
