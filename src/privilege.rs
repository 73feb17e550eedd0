//! One-way privilege drop to the build account.

use anyhow::Result;
use nix::unistd::{geteuid, setgid, setgroups, setuid};
use tracing::{debug, info};

use crate::error::Error;
use crate::identity::BuildIdentity;

/// Whether this process currently runs as root.
pub fn is_privileged() -> bool {
    geteuid().is_root()
}

/// Permanently switch this process to the build account.
///
/// A no-op when already unprivileged, so calling it again after a
/// successful drop is harmless. Order matters: supplementary groups and the
/// group id can only be changed while we are still root.
pub fn drop_privileges(build_user: &str) -> Result<()> {
    if !is_privileged() {
        debug!("Not running as root, nothing to drop");
        return Ok(());
    }

    let identity = BuildIdentity::require(build_user)?;

    setgroups(&[]).map_err(|source| Error::Privilege {
        step: "clear supplementary groups",
        source,
    })?;
    setgid(identity.gid).map_err(|source| Error::Privilege {
        step: "set group id",
        source,
    })?;
    setuid(identity.uid).map_err(|source| Error::Privilege {
        step: "set user id",
        source,
    })?;

    info!(
        "Dropped privileges to '{}' (uid {}, gid {})",
        identity.name, identity.uid, identity.gid
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run_in_child, UNPRIVILEGED_USER};
    use nix::unistd::{getegid, getgroups};
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_drop_is_one_way_and_repeatable() {
        let code = run_in_child(|| {
            drop_privileges(UNPRIVILEGED_USER).unwrap();
            assert!(!is_privileged());

            let after_first = (geteuid(), getegid());
            drop_privileges(UNPRIVILEGED_USER).unwrap();
            assert_eq!((geteuid(), getegid()), after_first);
            assert!(!is_privileged());
            0
        });
        assert_eq!(code, 0);
    }

    #[test]
    #[serial]
    fn test_drop_clears_supplementary_groups() {
        if !is_privileged() {
            // Nothing to clear without root; the drop is a no-op then.
            return;
        }
        let code = run_in_child(|| {
            drop_privileges(UNPRIVILEGED_USER).unwrap();
            let nobody = BuildIdentity::require(UNPRIVILEGED_USER).unwrap();
            assert_eq!(geteuid(), nobody.uid);
            assert_eq!(getegid(), nobody.gid);
            assert!(getgroups().unwrap().iter().all(|g| *g == nobody.gid));
            0
        });
        assert_eq!(code, 0);
    }

    #[test]
    #[serial]
    fn test_unknown_user_is_typed_error_when_privileged() {
        if !is_privileged() {
            return;
        }
        let code = run_in_child(|| {
            let err = drop_privileges("dsrun-no-such-user").unwrap_err();
            assert!(matches!(
                err.downcast_ref::<Error>(),
                Some(Error::UnknownIdentity { .. })
            ));
            // Nothing was changed on the way out.
            assert!(is_privileged());
            0
        });
        assert_eq!(code, 0);
    }
}
