//! Prepare commands - get the container ready for a build or a run.

use anyhow::Result;
use tracing::info;

use crate::apt::AptRunner;
use crate::common::first_subdir;
use crate::config::{Config, RunOptions};
use crate::environment::FastIoGuard;
use crate::identity::{self, BuildIdentity};
use crate::qa::QA_TOOL_PACKAGE;
use crate::repo;

/// Packages a package build needs on top of the build dependencies.
pub const BUILD_PACKAGES: [&str; 3] = ["build-essential", "dpkg-dev", "fakeroot"];

/// Serve injected packages if there are any, and bring the system up to date.
fn refresh_with_local_repo(config: &Config, apt: &AptRunner) -> Result<()> {
    match repo::synthesize_local_repo(config, apt)? {
        Some(local) => info!(
            "Local repository ready ({} bytes of package index)",
            local.digest.size
        ),
        // Synthesis refreshes on its own; without it we still need to.
        None => apt.refresh()?,
    }
    Ok(())
}

/// Execute the prepare-run command.
pub fn cmd_prepare_run(config: &Config) -> Result<()> {
    info!("Preparing container");
    let apt = AptRunner::new(config);

    let _fast_io = FastIoGuard::acquire(&config.fast_io_dir);
    refresh_with_local_repo(config, &apt)
}

/// Execute the prepare-build command.
pub fn cmd_prepare_build(config: &Config, options: &RunOptions) -> Result<()> {
    info!("Preparing container for build");
    let apt = AptRunner::new(config);

    let _fast_io = FastIoGuard::acquire(&config.fast_io_dir);
    refresh_with_local_repo(config, &apt)?;

    let mut packages = BUILD_PACKAGES.to_vec();
    if options.lintian {
        packages.push(QA_TOOL_PACKAGE);
    }
    apt.install(&packages)?;

    let builder = BuildIdentity::require(&config.build_user)?;
    identity::chown(&builder, &config.build_dir, true)?;

    let source_dir = first_subdir(&config.build_dir)?;
    info!("Installing build dependencies for {}", source_dir.display());

    // apt only treats the argument as a source tree with a trailing slash.
    let source_arg = format!("{}/", source_dir.display());
    let mut args = Vec::new();
    if options.arch_only {
        args.push("--arch-only");
    }
    args.push(source_arg.as_str());
    apt.run("build-dep", &args)
}
