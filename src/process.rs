//! Centralized command execution with consistent error handling.
//!
//! Every external tool the agent drives (package manager, index generator,
//! build tool, analysis tool, account management) goes through [`Cmd`], so
//! each invocation is echoed before it runs and every non-zero exit becomes
//! an [`Error::CommandFailed`] carrying the tool's exit code.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{error, info};

use crate::error::Error;

/// Builder for configuring command execution.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    current_dir: Option<PathBuf>,
    /// If true, don't fail on non-zero exit.
    allow_fail: bool,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
            allow_fail: false,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Add a path as an argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Set an environment variable for the child only.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.envs
            .push((key.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Allow non-zero exit codes without failing.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// The command line as it is echoed to the log.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn check(&self, status: ExitStatus) -> Result<()> {
        if self.allow_fail || status.success() {
            return Ok(());
        }
        let code = status.code().unwrap_or(-1);
        error!("Command '{}' failed with exit code {}", self.display(), code);
        Err(Error::CommandFailed {
            command: self.display(),
            code,
        }
        .into())
    }

    /// Run the command with inherited stdio (interactive/streaming).
    ///
    /// Output goes directly to the build log. The command line is echoed
    /// first so the log shows what ran.
    pub fn run_interactive(self) -> Result<ExitStatus> {
        info!(" ! {}", self.display());

        let mut cmd = self.command();
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let status = cmd.status().with_context(|| {
            format!("Failed to execute '{}'. Is it installed?", self.program)
        })?;

        self.check(status)?;
        Ok(status)
    }

    /// Run the command with stdout redirected byte-for-byte into `dest`.
    ///
    /// Stderr stays attached to the log. The destination is truncated first.
    pub fn run_to_file(self, dest: &Path) -> Result<ExitStatus> {
        info!(" ! {} > {}", self.display(), dest.display());

        let file = File::create(dest)
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        let mut cmd = self.command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::from(file));
        cmd.stderr(Stdio::inherit());

        let status = cmd.status().with_context(|| {
            format!("Failed to execute '{}'. Is it installed?", self.program)
        })?;

        self.check(status)?;
        Ok(status)
    }
}

/// Check if a program can be found, either as a path or in `PATH`.
pub fn which(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

// =============================================================================
// Tests
// =============================================================================
