//! The unprivileged build account.
//!
//! The account name is fixed; its numeric ids are resolved at runtime from
//! the container's user database, so the host can remap them per run.

use anyhow::{Context, Result};
use nix::unistd::{Gid, Uid, User};
use std::path::Path;
use tracing::info;

use crate::config::SENTINEL_DIR;
use crate::error::Error;
use crate::process::Cmd;

/// A resolved build account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIdentity {
    pub name: String,
    pub uid: Uid,
    pub gid: Gid,
}

impl BuildIdentity {
    /// Look up an account by name. `Ok(None)` if it doesn't exist.
    pub fn lookup(name: &str) -> Result<Option<Self>> {
        let user = User::from_name(name)
            .with_context(|| format!("while looking up user '{name}'"))?;

        Ok(user.map(|u| Self {
            name: u.name,
            uid: u.uid,
            gid: u.gid,
        }))
    }

    /// Look up an account that must exist.
    pub fn require(name: &str) -> Result<Self> {
        Self::lookup(name)?.ok_or_else(|| {
            Error::UnknownIdentity {
                name: name.to_string(),
            }
            .into()
        })
    }
}

/// Create the build account if it is missing, with the sentinel as home.
pub fn ensure_exists(name: &str) -> Result<BuildIdentity> {
    if let Some(identity) = BuildIdentity::lookup(name)? {
        return Ok(identity);
    }

    info!("No '{}' user, creating it.", name);
    Cmd::new("adduser")
        .args([
            "--system",
            "--no-create-home",
            "--disabled-password",
            "--home",
            SENTINEL_DIR,
            name,
        ])
        .run_interactive()?;

    BuildIdentity::require(name)
}

/// Give the build account a specific numeric user id.
pub fn remap_uid(identity: &BuildIdentity, uid: u32) -> Result<()> {
    if identity.uid.as_raw() == uid {
        return Ok(());
    }

    info!("Changing UID of '{}' to {}", identity.name, uid);
    Cmd::new("usermod")
        .arg("-u")
        .arg(uid.to_string())
        .arg(&identity.name)
        .run_interactive()?;
    Ok(())
}

/// Hand a directory over to the build account.
pub fn chown(identity: &BuildIdentity, path: &Path, recursive: bool) -> Result<()> {
    let mut cmd = Cmd::new("chown");
    if recursive {
        cmd = cmd.arg("-R");
    }
    cmd.arg(&identity.name).arg_path(path).run_interactive()?;
    Ok(())
}
