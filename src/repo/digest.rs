//! Single-pass checksums for the package index.

use anyhow::{Context, Result};
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read size used while hashing.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Checksums and length of one file, as listed in a Release manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDigest {
    pub md5: String,
    pub sha256: String,
    pub size: u64,
}

impl IndexDigest {
    /// Hash everything `reader` yields, feeding each chunk to both hashers.
    pub fn from_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut md5 = Md5::new();
        let mut sha256 = Sha256::new();
        let mut size = 0u64;
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            md5.update(&buf[..n]);
            sha256.update(&buf[..n]);
            size += n as u64;
        }

        Ok(Self {
            md5: hex::encode(md5.finalize()),
            sha256: hex::encode(sha256.finalize()),
            size,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("Failed to read {}", path.display()))
    }
}
