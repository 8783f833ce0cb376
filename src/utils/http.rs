//! HTTP utilities for downloading wheels.

use crate::error::{ErrorExt, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// User agent sent to package indexes.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Downloads a file from a URL, streaming it to `dest`.
///
/// Returns the number of bytes written. Non-success status codes are errors.
pub async fn download_to_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64> {
    log::debug!("Downloading {} to {}", url, dest.display());

    let mut response = client.get(url).send().await?.error_for_status()?;

    let mut file = tokio::fs::File::create(dest)
        .await
        .fs_context("creating download file", dest)?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .fs_context("writing download file", dest)?;
        written += chunk.len() as u64;
    }
    file.flush().await.fs_context("flushing download file", dest)?;

    Ok(written)
}
