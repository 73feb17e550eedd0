//! Local repository for injected packages.
//!
//! Packages the host drops into the extra-packages directory are turned
//! into a flat APT repository: a `Packages` index generated by
//! `apt-ftparchive`, a `Release` manifest carrying its checksums, and a
//! trusted source list entry. The repository is rebuilt from scratch on
//! every run; only the index content is reproducible, the manifest date
//! changes each time.

mod digest;
mod release;

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::apt::AptRunner;
use crate::common::{append_line_once, is_empty_dir, write_file_with_dirs};
use crate::config::Config;
use crate::error::Error;
use crate::process::Cmd;

pub use digest::{IndexDigest, CHUNK_SIZE};
pub use release::{render_release, source_line, REPO_COMPONENT, REPO_ORIGIN};

/// Name of the generated package index.
pub const INDEX_FILE: &str = "Packages";
/// Name of the generated manifest.
pub const MANIFEST_FILE: &str = "Release";
/// Package providing the index generator.
pub const INDEX_TOOL_PACKAGE: &str = "apt-utils";

/// What a synthesis run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    pub dir: PathBuf,
    pub index: PathBuf,
    pub manifest: PathBuf,
    pub digest: IndexDigest,
}

/// Build the local repository, if there is anything to serve.
///
/// Returns `None` without touching anything when the directory is absent
/// or empty. Otherwise package lists have been refreshed and upgraded
/// against the new source by the time this returns.
pub fn synthesize_local_repo(config: &Config, apt: &AptRunner) -> Result<Option<LocalRepository>> {
    let dir = &config.extra_packages_dir;
    if is_empty_dir(dir) {
        return Ok(None);
    }

    info!("Creating local repository from {}", dir.display());

    apt.ensure_tool(&config.index_tool, INDEX_TOOL_PACKAGE)?;

    let index = dir.join(INDEX_FILE);
    generate_index(&config.index_tool, dir, &index)?;

    let digest = IndexDigest::from_file(&index)?;

    let manifest = dir.join(MANIFEST_FILE);
    write_file_with_dirs(&manifest, render_release(&digest, Utc::now()))?;

    if append_line_once(&config.sources_list, &source_line(dir))? {
        info!("Registered {} in {}", dir.display(), config.sources_list.display());
    }

    apt.refresh()?;

    Ok(Some(LocalRepository {
        dir: dir.clone(),
        index,
        manifest,
        digest,
    }))
}

fn generate_index(tool: &str, dir: &Path, index: &Path) -> Result<()> {
    let status = Cmd::new(tool)
        .args(["packages", "."])
        .dir(dir)
        .allow_fail()
        .run_to_file(index)?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        error!("Unable to build package index: '{} packages .' exited with {}", tool, code);
        return Err(Error::IndexGeneration {
            dir: dir.to_path_buf(),
            code,
        }
        .into());
    }
    Ok(())
}
