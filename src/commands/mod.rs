//! Action dispatch.
//!
//! Each invocation runs exactly one action. Submodules hold the handlers:
//! - `initialize` - refresh the container image and set up the build user
//! - `prepare` - prepare a build or an arbitrary run
//! - `build` - build the package as the build user
//! - `qa` - run static analysis on the result

mod build;
mod initialize;
mod prepare;
mod qa;

use tracing::error;

use crate::config::{Config, RunOptions};
use crate::environment::configure_environment;
use crate::error::{exit_code_for, EXIT_SUCCESS, EXIT_USAGE};
use crate::timing::Timer;

pub use build::cmd_build;
pub use initialize::cmd_initialize;
pub use prepare::{cmd_prepare_build, cmd_prepare_run};
pub use qa::cmd_qa;

/// The top-level action of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Refresh the container image and (re)create the build user.
    Initialize,
    /// Install build dependencies for the unpacked source.
    PrepareBuild,
    /// Build the package.
    RunBuild,
    /// Prepare the container for running an arbitrary command.
    PrepareRun,
    /// Run QA checks on the build result.
    RunQa,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Initialize => "initialize",
            Action::PrepareBuild => "prepare build",
            Action::RunBuild => "build",
            Action::PrepareRun => "prepare run",
            Action::RunQa => "QA",
        }
    }
}

/// Run the selected action and map its outcome to a process exit code.
///
/// Nothing happens outside a container or when no action was selected;
/// both are usage errors. Environment setup precedes every action.
pub fn dispatch(action: Option<Action>, options: &RunOptions, config: &Config) -> i32 {
    if !config.in_container() {
        error!("This helper must be run inside a container.");
        return EXIT_USAGE;
    }

    let Some(action) = action else {
        error!("No action specified.");
        return EXIT_USAGE;
    };

    config.print();
    configure_environment(config, options, action == Action::Initialize);

    let timer = Timer::start(action.name());
    let result = match action {
        Action::Initialize => cmd_initialize(config, options),
        Action::PrepareBuild => cmd_prepare_build(config, options),
        Action::RunBuild => cmd_build(config, options),
        Action::PrepareRun => cmd_prepare_run(config),
        Action::RunQa => cmd_qa(config, options),
    };

    timer.finish(result.is_ok());
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!("{} failed: {:#}", action.name(), e);
            exit_code_for(&e)
        }
    }
}
