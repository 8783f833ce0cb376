//! Download integrity checks.
//!
//! Files are read in 8KB chunks so large wheels are never held in memory.

use crate::error::{ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::{fmt, path::Path};
use tokio::io::AsyncReadExt;

/// Digest algorithms package indexes publish.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DigestAlgorithm {
    Sha256,
    Md5,
}

impl DigestAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Md5 => "md5",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hex-encoded digest of a file.
pub async fn file_digest(path: &Path, algorithm: DigestAlgorithm) -> Result<String> {
    match algorithm {
        DigestAlgorithm::Sha256 => calculate_file_sha256(path).await,
        DigestAlgorithm::Md5 => calculate_file_md5(path).await,
    }
}

/// Calculates SHA256 checksum of a single file.
async fn calculate_file_sha256(file_path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    read_chunks(file_path, |chunk| hasher.update(chunk)).await?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Calculates MD5 checksum of a single file.
async fn calculate_file_md5(file_path: &Path) -> Result<String> {
    let mut context = md5::Context::new();
    read_chunks(file_path, |chunk| context.consume(chunk)).await?;
    Ok(format!("{:x}", context.finalize()))
}

async fn read_chunks(file_path: &Path, mut sink: impl FnMut(&[u8])) -> Result<()> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        sink(&buffer[..n]);
    }
    Ok(())
}
