//! Package manager transactions.
//!
//! Every call runs `apt-get` non-interactively with the same global flags.
//! Only `update` is retried: it is the step exposed to mirror and network
//! flakiness. Any other failure is real breakage and fails immediately.

use anyhow::Result;
use std::thread;
use tracing::{error, info, warn};

use crate::config::{Config, RetryPolicy};
use crate::error::Error;
use crate::process::{self, Cmd};

/// Flags passed to every package manager invocation.
pub const GLOBAL_FLAGS: [&str; 3] = ["-uyq", "-o", "Dpkg::Options::=--force-confnew"];

/// Frontend variable set for the package manager only.
pub const FRONTEND_VAR: (&str, &str) = ("DEBIAN_FRONTEND", "noninteractive");

/// The one subcommand that is retried.
pub const UPDATE: &str = "update";

/// Runs one-shot package manager transactions.
#[derive(Debug, Clone)]
pub struct AptRunner {
    program: String,
    retry: RetryPolicy,
}

impl AptRunner {
    pub fn new(config: &Config) -> Self {
        Self::with_program(&config.apt_get, config.update_retry)
    }

    pub fn with_program(program: &str, retry: RetryPolicy) -> Self {
        Self {
            program: program.to_string(),
            retry,
        }
    }

    fn command(&self, subcommand: &str, args: &[&str]) -> Cmd {
        Cmd::new(&self.program)
            .args(GLOBAL_FLAGS)
            .arg(subcommand)
            .args(args)
            .env(FRONTEND_VAR.0, FRONTEND_VAR.1)
    }

    /// Run a transaction; any failure is fatal.
    pub fn run(&self, subcommand: &str, args: &[&str]) -> Result<()> {
        if subcommand == UPDATE {
            return self.update(args);
        }
        self.command(subcommand, args).run_interactive()?;
        Ok(())
    }

    /// Run a transaction, reporting failure as `Ok(false)` instead of an error.
    ///
    /// Errors are still returned when the package manager could not be
    /// started at all.
    pub fn run_nonfatal(&self, subcommand: &str, args: &[&str]) -> Result<bool> {
        match self.run(subcommand, args) {
            Ok(()) => Ok(true),
            Err(e) => match e.downcast_ref::<Error>() {
                Some(Error::CommandFailed { .. } | Error::UpdateExhausted { .. }) => {
                    warn!("Ignoring failed package transaction: {}", e);
                    Ok(false)
                }
                _ => Err(e),
            },
        }
    }

    fn update(&self, args: &[&str]) -> Result<()> {
        let cmd = self.command(UPDATE, args).allow_fail();
        let attempts = self.retry.attempts.max(1);

        let mut attempt = 1;
        loop {
            let status = cmd.clone().run_interactive()?;
            if status.success() {
                return Ok(());
            }

            let code = status.code().unwrap_or(-1);
            if attempt >= attempts {
                error!(
                    "Command '{}' failed {} times, giving up (exit code {})",
                    cmd.display(),
                    attempts,
                    code
                );
                return Err(Error::UpdateExhausted {
                    command: cmd.display(),
                    attempts,
                    code,
                }
                .into());
            }

            warn!(
                "Package list update failed (exit code {}), retrying in {}s ({}/{})",
                code,
                self.retry.delay.as_secs_f32(),
                attempt,
                attempts
            );
            thread::sleep(self.retry.delay);
            attempt += 1;
        }
    }

    /// Install packages without recommends.
    pub fn install(&self, packages: &[&str]) -> Result<()> {
        let mut args = vec!["--no-install-recommends"];
        args.extend_from_slice(packages);
        self.run("install", &args)
    }

    /// Install `package` unless `program` can already be found.
    pub fn ensure_tool(&self, program: &str, package: &str) -> Result<()> {
        if let Some(path) = process::which(program) {
            info!("Using {} from {}", program, path.display());
            return Ok(());
        }
        self.install(&[package])
    }

    /// Refresh package lists and upgrade everything installed.
    pub fn refresh(&self) -> Result<()> {
        self.run(UPDATE, &[])?;
        self.run("full-upgrade", &[])
    }
}
