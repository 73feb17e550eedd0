//! Fatal error taxonomy and its mapping to process exit codes.
//!
//! Library code returns `anyhow::Result`. Failures that the invoking host
//! must be able to tell apart are raised as [`Error`] values, and the
//! orchestrator downcasts to find the exit code.

use std::path::PathBuf;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for usage errors: no/invalid action, or not inside a container.
pub const EXIT_USAGE: i32 = 1;
/// Exit code for a phase that failed without a tool exit code to forward.
pub const EXIT_PHASE_FAILED: i32 = 2;
/// Exit code used when the package index for injected packages can't be built.
pub const EXIT_INDEX_FAILED: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("command '{command}' failed (exit code {code})")]
    CommandFailed { command: String, code: i32 },

    #[error("'{command}' still failing after {attempts} attempts (exit code {code})")]
    UpdateExhausted {
        command: String,
        attempts: u32,
        code: i32,
    },

    #[error("unable to generate package index for {} (exit code {code})", dir.display())]
    IndexGeneration { dir: PathBuf, code: i32 },

    #[error("no source directory found in {}", dir.display())]
    NoSourceTree { dir: PathBuf },

    #[error("build user '{name}' does not exist")]
    UnknownIdentity { name: String },

    #[error("failed to {step}: {source}")]
    Privilege {
        step: &'static str,
        source: nix::Error,
    },
}

impl Error {
    /// Exit code the process should terminate with for this error.
    ///
    /// Tool exit codes are forwarded unchanged as long as they are
    /// representable; signals and out-of-range codes collapse to
    /// [`EXIT_PHASE_FAILED`].
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandFailed { code, .. } | Error::UpdateExhausted { code, .. } => {
                forwardable(*code)
            }
            Error::IndexGeneration { .. } => EXIT_INDEX_FAILED,
            Error::NoSourceTree { .. } | Error::UnknownIdentity { .. } | Error::Privilege { .. } => {
                EXIT_PHASE_FAILED
            }
        }
    }
}

/// Exit code for an arbitrary error coming out of a phase.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(Error::exit_code)
        .unwrap_or(EXIT_PHASE_FAILED)
}

fn forwardable(code: i32) -> i32 {
    if (1..=255).contains(&code) {
        code
    } else {
        EXIT_PHASE_FAILED
    }
}
