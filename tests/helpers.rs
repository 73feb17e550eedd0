//! Shared test utilities for dsrun tests.
//!
//! External tools are replaced by small shell scripts that append their
//! arguments to a log file, so tests can check exactly what ran.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Duration;

use dsrun::config::{Config, RetryPolicy};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, geteuid, ForkResult, User};
use tempfile::TempDir;

/// Retry pause used in tests instead of the real five seconds.
pub const TEST_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Account phases drop to when the suite runs as root.
pub const UNPRIVILEGED_USER: &str = "nobody";

/// Test environment with a fake container filesystem layout.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub build_dir: PathBuf,
    pub extra_dir: PathBuf,
    pub sources_list: PathBuf,
    pub sentinel: PathBuf,
    pub bin_dir: PathBuf,
    /// Every stub appends one line per invocation here
    pub log: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();

        let env = Self {
            build_dir: root.join("srv/build"),
            extra_dir: root.join("srv/extra-packages"),
            sources_list: root.join("etc/apt/sources.list"),
            sentinel: root.join("nonexistent"),
            bin_dir: root.join("bin"),
            log: root.join("invocations.log"),
            root,
            _temp_dir: temp_dir,
        };

        fs::create_dir_all(&env.build_dir).expect("Failed to create build dir");
        fs::create_dir_all(&env.bin_dir).expect("Failed to create bin dir");
        fs::create_dir_all(env.sources_list.parent().unwrap()).expect("Failed to create apt dir");
        fs::write(&env.sources_list, "deb http://deb.debian.org/debian sid main\n")
            .expect("Failed to create sources.list");

        // Succeeding stubs by default; tests replace them as needed.
        env.stub_apt(0, 0);
        env.stub("index-tool", "printf 'Package: hello\\nVersion: 1.0\\n\\n'");
        env.stub("build-tool", "exit 0");
        env.stub("qa-tool", "exit 0");
        env
    }

    /// Configuration pointing every path and tool into this environment.
    pub fn config(&self) -> Config {
        let mut vars = HashMap::new();
        vars.insert("container".to_string(), "dsrun-test".to_string());
        vars.insert("DSRUN_BUILD_DIR".to_string(), path_str(&self.build_dir));
        vars.insert("DSRUN_EXTRA_PACKAGES_DIR".to_string(), path_str(&self.extra_dir));
        vars.insert("DSRUN_SOURCES_LIST".to_string(), path_str(&self.sources_list));
        vars.insert("DSRUN_APT_GET".to_string(), path_str(&self.bin_dir.join("apt-get")));
        vars.insert("DSRUN_INDEX_TOOL".to_string(), path_str(&self.bin_dir.join("index-tool")));
        vars.insert("DSRUN_BUILD_TOOL".to_string(), path_str(&self.bin_dir.join("build-tool")));
        vars.insert("DSRUN_QA_TOOL".to_string(), path_str(&self.bin_dir.join("qa-tool")));
        // Never populated, so package transactions run without a preload.
        vars.insert("DSRUN_FAST_IO_DIR".to_string(), path_str(&self.root.join("libeatmydata")));

        let mut config = Config::from_vars(vars);
        config.sentinel_dirs = vec![self.sentinel.clone()];
        config.update_retry = RetryPolicy {
            attempts: 3,
            delay: TEST_RETRY_DELAY,
        };
        config
    }

    /// Write an executable stub named `name` that logs its arguments and
    /// then runs `body`.
    pub fn stub(&self, name: &str, body: &str) -> PathBuf {
        let path = self.bin_dir.join(name);
        let script = format!(
            "#!/bin/sh\necho \"{name} $*\" >> \"{log}\"\n{body}\n",
            name = name,
            log = self.log.display(),
            body = body,
        );
        fs::write(&path, script).expect("Failed to write stub");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to set permissions");
        path
    }

    /// Package manager stub.
    ///
    /// The first `failing_updates` `update` calls exit with 100; any other
    /// subcommand exits with `other_exit`.
    pub fn stub_apt(&self, failing_updates: u32, other_exit: i32) -> PathBuf {
        let counter = self.root.join("update-count");
        let body = format!(
            r#"echo "frontend=$DEBIAN_FRONTEND" >> "{log}"
for arg in "$@"; do
  if [ "$arg" = update ]; then
    n=$(cat "{counter}" 2>/dev/null || echo 0)
    n=$((n + 1))
    echo "$n" > "{counter}"
    if [ "$n" -le {failing} ]; then exit 100; fi
    exit 0
  fi
done
exit {other}"#,
            log = self.log.display(),
            counter = counter.display(),
            failing = failing_updates,
            other = other_exit,
        );
        self.stub("apt-get", &body)
    }

    /// Logged invocations of the stub `name`, arguments only.
    pub fn invocations(&self, name: &str) -> Vec<String> {
        let prefix = format!("{} ", name);
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .filter_map(|line| line.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    /// All raw log lines.
    pub fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Let any account use the environment.
    ///
    /// Needed before dropping privileges in a child: the temporary root is
    /// private to its creator, and stubs must stay executable and able to
    /// append to the invocation log.
    pub fn share_with_everyone(&self) {
        share_tree(&self.root);
    }

    /// Number of `update` invocations seen by the package manager stub.
    pub fn update_count(&self) -> usize {
        self.invocations("apt-get")
            .iter()
            .filter(|args| args.ends_with(" update"))
            .count()
    }
}

fn share_tree(path: &Path) {
    let meta = fs::symlink_metadata(path).expect("Failed to stat");
    let mode = meta.permissions().mode();
    if meta.is_dir() {
        fs::set_permissions(path, fs::Permissions::from_mode(0o777))
            .expect("Failed to set permissions");
        for entry in fs::read_dir(path).expect("Failed to read dir") {
            share_tree(&entry.expect("Failed to read entry").path());
        }
    } else if meta.is_file() {
        fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o666))
            .expect("Failed to set permissions");
    }
}

/// Name of the account running the tests.
pub fn current_user() -> String {
    User::from_uid(geteuid())
        .expect("Failed to look up current user")
        .expect("Current user has no passwd entry")
        .name
}

/// Run `f` in a forked child and return the child's exit code.
///
/// For phases that drop privileges, which can't be undone in the test
/// process. A panic in the child becomes exit code 101.
pub fn run_in_child<F: FnOnce() -> i32>(f: F) -> i32 {
    match unsafe { fork() }.expect("fork failed") {
        ForkResult::Child => {
            let code = panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or(101);
            // No destructors: the parent still owns the temporary tree.
            std::process::exit(code);
        }
        ForkResult::Parent { child } => match waitpid(child, None).expect("waitpid failed") {
            WaitStatus::Exited(_, code) => code,
            other => panic!("child did not exit normally: {:?}", other),
        },
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.is_file(), "Expected file at {}", path.display());
}

/// Assert that a file contains a specific string.
pub fn assert_file_contains(path: &Path, needle: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    assert!(
        content.contains(needle),
        "Expected {} to contain '{}', got:\n{}",
        path.display(),
        needle,
        content
    );
}
