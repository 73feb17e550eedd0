//! Initialize command - refreshes the container image.

use anyhow::Result;
use tracing::info;

use crate::apt::AptRunner;
use crate::common::ensure_dir_exists;
use crate::config::{Config, RunOptions};
use crate::environment::FastIoGuard;
use crate::identity;

/// Packages every build environment carries.
pub const BASE_PACKAGES: [&str; 4] = ["build-essential", "dpkg-dev", "fakeroot", "eatmydata"];

/// Execute the initialize command.
pub fn cmd_initialize(config: &Config, options: &RunOptions) -> Result<()> {
    info!("Updating container");
    let apt = AptRunner::new(config);

    {
        let _fast_io = FastIoGuard::acquire(&config.fast_io_dir);
        apt.refresh()?;
        apt.install(&BASE_PACKAGES)?;
        apt.run("autoremove", &["--purge"])?;
        apt.run("clean", &[])?;
    }

    let builder = identity::ensure_exists(&config.build_user)?;
    if let Some(uid) = options.builder_uid.filter(|uid| *uid > 0) {
        identity::remap_uid(&builder, uid)?;
    }

    ensure_dir_exists(&config.build_dir)?;
    identity::chown(&builder, &config.build_dir, false)?;

    info!("Container is up to date");
    Ok(())
}
