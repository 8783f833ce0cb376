//! Package index access.
//!
//! [`PackageIndex`] is the seam between the locator and the network;
//! [`PyPiIndex`] talks to the PyPI JSON API.

use crate::{
    error::Result,
    utils::{
        checksum::DigestAlgorithm,
        http::{USER_AGENT, download_to_file},
    },
};
use serde::Deserialize;
use std::{collections::HashMap, future::Future, path::Path};
use url::Url;

/// A project as reported by the index: every release and its files.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IndexProject {
    #[serde(default)]
    pub releases: HashMap<String, Vec<IndexFile>>,
}

impl IndexProject {
    /// Files of one release, `None` if the index has no such version.
    pub fn release(&self, version: &str) -> Option<&[IndexFile]> {
        self.releases.get(version).map(Vec::as_slice)
    }
}

/// One downloadable file of a release.
#[derive(Clone, Debug, Deserialize)]
pub struct IndexFile {
    pub filename: String,
    pub url: String,
    /// `bdist_wheel`, `sdist`, ...
    #[serde(rename = "packagetype")]
    pub package_type: String,
    #[serde(default)]
    pub digests: Digests,
    #[serde(default)]
    pub md5_digest: Option<String>,
}

/// Published digests of a file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Digests {
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
}

impl IndexFile {
    /// Strongest digest the index published, if any.
    pub fn expected_digest(&self) -> Option<(DigestAlgorithm, &str)> {
        fn non_empty(d: &Option<String>) -> Option<&str> {
            d.as_deref().filter(|d| !d.is_empty())
        }

        non_empty(&self.digests.sha256)
            .map(|d| (DigestAlgorithm::Sha256, d))
            .or_else(|| {
                non_empty(&self.digests.md5)
                    .or_else(|| non_empty(&self.md5_digest))
                    .map(|d| (DigestAlgorithm::Md5, d))
            })
    }
}

/// Source of remote releases.
pub trait PackageIndex {
    /// Look up a project by name; `Ok(None)` when the index has no such project.
    fn project(&self, name: &str) -> impl Future<Output = Result<Option<IndexProject>>> + Send;

    /// Download `url` to `dest`, replacing any existing file.
    fn download(&self, url: &str, dest: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// The PyPI JSON API (`{base}/pypi/{name}/json`).
#[derive(Clone, Debug)]
pub struct PyPiIndex {
    client: reqwest::Client,
    base: Url,
}

impl PyPiIndex {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client, base })
    }

    fn project_url(&self, name: &str) -> Result<Url> {
        Ok(self.base.join(&format!("pypi/{name}/json"))?)
    }
}

impl PackageIndex for PyPiIndex {
    async fn project(&self, name: &str) -> Result<Option<IndexProject>> {
        let url = self.project_url(name)?;
        log::debug!("Querying package index: {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.error_for_status()?.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        download_to_file(&self.client, url, dest).await?;
        Ok(())
    }
}
