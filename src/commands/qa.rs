//! QA command - runs static analysis on the build result.

use anyhow::Result;

use crate::apt::AptRunner;
use crate::config::{Config, RunOptions};
use crate::qa::{self, QaTools};

/// Execute the QA command.
pub fn cmd_qa(config: &Config, options: &RunOptions) -> Result<()> {
    let tools = QaTools {
        qa_tool: &config.qa_tool,
        build_user: &config.build_user,
    };
    qa::run_qa(tools, &AptRunner::new(config), &config.build_dir, options.lintian)
}
