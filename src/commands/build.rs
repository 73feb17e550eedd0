//! Build command - builds the package as the build user.

use anyhow::Result;
use tracing::info;

use crate::builder;
use crate::config::{Config, RunOptions};
use crate::privilege;

/// Execute the build command.
pub fn cmd_build(config: &Config, options: &RunOptions) -> Result<()> {
    privilege::drop_privileges(&config.build_user)?;

    let source_dir = builder::build_package(
        &config.build_tool,
        &config.build_dir,
        &options.build_flags,
        options.suite.as_deref(),
    )?;

    info!("Build of {} completed", source_dir.display());
    Ok(())
}
