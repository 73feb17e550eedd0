//! Configuration for dsrun.
//!
//! Two values are threaded through every phase:
//! - [`Config`]: fixed paths and tool programs, read from the environment
//!   with defaults matching the container filesystem contract.
//! - [`RunOptions`]: what the host asked for on the command line.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::environment::FAST_IO_LIBRARY_DIR;

/// Fixed logical account used for building and QA.
pub const BUILD_USER: &str = "builder";

/// Home of the build user. Must never exist or be writable.
pub const SENTINEL_DIR: &str = "/nonexistent";

/// Home used by sbuild-style setups for identities that must not persist state.
pub const INVALID_IDENTITY_DIR: &str = "/sbuild-nonexistent";

/// Environment variable set by the container manager inside a container.
pub const CONTAINER_MARKER: &str = "container";

/// How often `apt-get update` is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// dsrun configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of extracted sources (default: /srv/build)
    pub build_dir: PathBuf,
    /// Injected packages to expose as a local repository (default: /srv/extra-packages)
    pub extra_packages_dir: PathBuf,
    /// APT source list the local repository is registered in
    pub sources_list: PathBuf,
    /// Paths that must stay absent for unprivileged code
    pub sentinel_dirs: Vec<PathBuf>,
    /// Name of the unprivileged build account
    pub build_user: String,
    /// Package manager program
    pub apt_get: String,
    /// Package index generator program
    pub index_tool: String,
    /// Package build program
    pub build_tool: String,
    /// Static analysis program
    pub qa_tool: String,
    /// Where the fast-I/O preload library is installed
    pub fast_io_dir: PathBuf,
    /// Value of the container marker, if present and non-empty
    pub container: Option<String>,
    /// Retry behaviour for `apt-get update`
    pub update_retry: RetryPolicy,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build a configuration from an explicit variable map.
    pub fn from_vars(env_vars: HashMap<String, String>) -> Self {
        let path = |key: &str, default: &str| {
            PathBuf::from(env_vars.get(key).map(String::as_str).unwrap_or(default))
        };
        let program = |key: &str, default: &str| {
            env_vars
                .get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        let container = env_vars
            .get(CONTAINER_MARKER)
            .filter(|v| !v.is_empty())
            .cloned();

        Self {
            build_dir: path("DSRUN_BUILD_DIR", "/srv/build"),
            extra_packages_dir: path("DSRUN_EXTRA_PACKAGES_DIR", "/srv/extra-packages"),
            sources_list: path("DSRUN_SOURCES_LIST", "/etc/apt/sources.list"),
            sentinel_dirs: vec![
                PathBuf::from(SENTINEL_DIR),
                PathBuf::from(INVALID_IDENTITY_DIR),
            ],
            build_user: BUILD_USER.to_string(),
            apt_get: program("DSRUN_APT_GET", "apt-get"),
            index_tool: program("DSRUN_INDEX_TOOL", "apt-ftparchive"),
            build_tool: program("DSRUN_BUILD_TOOL", "dpkg-buildpackage"),
            qa_tool: program("DSRUN_QA_TOOL", "lintian"),
            fast_io_dir: path("DSRUN_FAST_IO_DIR", FAST_IO_LIBRARY_DIR),
            container,
            update_retry: RetryPolicy::default(),
        }
    }

    /// Whether we run inside a supported execution context.
    pub fn in_container(&self) -> bool {
        self.container.is_some()
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        tracing::debug!(
            build_dir = %self.build_dir.display(),
            extra_packages_dir = %self.extra_packages_dir.display(),
            sources_list = %self.sources_list.display(),
            container = self.container.as_deref().unwrap_or("-"),
            "Configuration"
        );
    }
}

/// What the host asked this invocation to do, besides the action itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub unicode: bool,
    pub color: bool,
    /// Numeric id the build user should have, if the host wants a specific one
    pub builder_uid: Option<u32>,
    /// Only install architecture-dependent build dependencies
    pub arch_only: bool,
    /// Extra flags passed through to the build tool
    pub build_flags: Vec<String>,
    /// Distribution to record in the generated changes file
    pub suite: Option<String>,
    /// Run static analysis after the build
    pub lintian: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            unicode: true,
            color: true,
            builder_uid: None,
            arch_only: false,
            build_flags: Vec::new(),
            suite: None,
            lintian: false,
        }
    }
}

/// Split a `;`-joined flag string into individual build flags.
///
/// The host hands the flags over as one (possibly quoted) string, so quotes
/// and spaces around each element are stripped and empty elements dropped.
pub fn parse_build_flags(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(|flag| flag.trim_matches(|c| c == ' ' || c == '"' || c == '\''))
        .filter(|flag| !flag.is_empty())
        .map(str::to_string)
        .collect()
}
