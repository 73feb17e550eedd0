//! Static analysis of the build result.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::apt::AptRunner;
use crate::common::first_subdir;
use crate::privilege;
use crate::process::Cmd;

/// Package providing the analysis tool.
pub const QA_TOOL_PACKAGE: &str = "lintian";

/// Flags the analysis tool always runs with: informational and pedantic
/// tags, no cap on how often a tag is shown.
pub const QA_FLAGS: [&str; 3] = ["-I", "--pedantic", "--no-tag-display-limit"];

/// Tools and accounts the QA step needs.
#[derive(Debug, Clone, Copy)]
pub struct QaTools<'a> {
    pub qa_tool: &'a str,
    pub build_user: &'a str,
}

/// Run static analysis on the package built under `build_dir`.
///
/// Installs the tool while still privileged, then drops to the build user.
/// Findings that make the tool exit non-zero fail the run.
pub fn run_qa(tools: QaTools<'_>, apt: &AptRunner, build_dir: &Path, enabled: bool) -> Result<()> {
    let source_dir = first_subdir(build_dir)?;

    if !enabled {
        info!("No QA checks requested");
        return Ok(());
    }

    apt.ensure_tool(tools.qa_tool, QA_TOOL_PACKAGE)?;
    privilege::drop_privileges(tools.build_user)?;

    info!("Running static analysis in {}", source_dir.display());
    Cmd::new(tools.qa_tool)
        .args(QA_FLAGS)
        .dir(&source_dir)
        .run_interactive()?;

    Ok(())
}
