//! dsrun - build agent running inside an ephemeral build container.
//!
//! The host starts one dsrun per phase: initialize the image, prepare a
//! build, run it, run QA, or prepare the container for a custom command.

use clap::{ArgGroup, Parser};

use dsrun::commands::{self, Action};
use dsrun::config::{parse_build_flags, Config, RunOptions};
use dsrun::error::{EXIT_SUCCESS, EXIT_USAGE};
use dsrun::logging::{init_logging, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "dsrun", version)]
#[command(about = "Build helper running inside the build container")]
#[command(group(ArgGroup::new("action").multiple(false)))]
struct Cli {
    /// Initialize or refresh the container
    #[arg(long, group = "action")]
    update: bool,

    /// Prepare building a Debian package
    #[arg(long = "build-prepare", group = "action")]
    build_prepare: bool,

    /// Build a Debian package
    #[arg(long = "build-run", group = "action")]
    build_run: bool,

    /// Prepare the container for running a custom command
    #[arg(long = "prepare-run", group = "action")]
    prepare_run: bool,

    /// Run QA checks on the built package
    #[arg(long = "run-qa", group = "action")]
    run_qa: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Disable unicode output
    #[arg(long)]
    no_unicode: bool,

    /// Numeric user id the build user should have
    #[arg(long = "buid", value_name = "UID")]
    builder_uid: Option<u32>,

    /// Only install architecture-dependent build dependencies
    #[arg(long)]
    arch_only: bool,

    /// Flags passed to the build tool, separated by ';'
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    buildflags: Option<String>,

    /// Suite name recorded in the changes file
    #[arg(long)]
    suite: Option<String>,

    /// Run lintian as part of QA
    #[arg(long)]
    lintian: bool,
}

impl Cli {
    fn action(&self) -> Option<Action> {
        [
            (self.update, Action::Initialize),
            (self.build_prepare, Action::PrepareBuild),
            (self.build_run, Action::RunBuild),
            (self.prepare_run, Action::PrepareRun),
            (self.run_qa, Action::RunQa),
        ]
        .into_iter()
        .find_map(|(selected, action)| selected.then_some(action))
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            unicode: !self.no_unicode,
            color: !self.no_color,
            builder_uid: self.builder_uid,
            arch_only: self.arch_only,
            build_flags: self
                .buildflags
                .as_deref()
                .map(parse_build_flags)
                .unwrap_or_default(),
            suite: self.suite.clone(),
            lintian: self.lintian,
        }
    }
}

/// `--help` and `--version` succeed; everything else is a usage error.
fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        EXIT_USAGE
    } else {
        EXIT_SUCCESS
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // With the output streams gone the exit code is all the host gets.
            let _ = e.print();
            std::process::exit(parse_exit_code(&e));
        }
    };

    let options = cli.options();
    init_logging(&LoggingConfig::with_color(options.color));

    let config = Config::load();
    std::process::exit(commands::dispatch(cli.action(), &options, &config));
}
