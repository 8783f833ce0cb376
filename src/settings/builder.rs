//! Builder for constructing WheelSettings.

use super::{CacheRoot, DEFAULT_INDEX_URL, Platform, PythonVersion, TargetEnvironment, WheelSettings};
use crate::error::{Context, Result};
use std::path::{Path, PathBuf};

/// Builder for [`WheelSettings`].
///
/// `target_dir` and `python_version` are required. Bitness defaults to 64,
/// the cache root to [`CacheRoot::from_env`] and the index to PyPI.
#[derive(Default)]
pub struct WheelSettingsBuilder {
    requirements: Vec<String>,
    wheel_globs: Vec<String>,
    extra_sources: Vec<PathBuf>,
    target_dir: Option<PathBuf>,
    python_version: Option<String>,
    bitness: Option<u32>,
    exclude: Vec<String>,
    cache_root: Option<CacheRoot>,
    index_url: Option<String>,
}

impl WheelSettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the `name==version` requirements to resolve.
    pub fn requirements(mut self, requirements: Vec<String>) -> Self {
        self.requirements = requirements;
        self
    }

    /// Sets the glob patterns naming local wheel files.
    pub fn wheel_globs(mut self, globs: Vec<String>) -> Self {
        self.wheel_globs = globs;
        self
    }

    /// Sets extra local directories searched before the cache.
    pub fn extra_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.extra_sources = sources;
        self
    }

    /// Sets the directory packages are merged into.
    ///
    /// # Required
    pub fn target_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.target_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the target Python version, e.g. `"3.8"` or `"3.8.10"`.
    ///
    /// # Required
    pub fn python_version(mut self, version: impl Into<String>) -> Self {
        self.python_version = Some(version.into());
        self
    }

    /// Sets the target bitness (32 or 64).
    pub fn bitness(mut self, bitness: u32) -> Self {
        self.bitness = Some(bitness);
        self
    }

    /// Sets the exclusion patterns applied while extracting.
    pub fn exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    /// Overrides the cache root.
    pub fn cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(CacheRoot::new(root));
        self
    }

    /// Overrides the package index base URL.
    pub fn index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = Some(url.into());
        self
    }

    /// Builds the settings.
    pub fn build(self) -> Result<WheelSettings> {
        let target_dir = self.target_dir.context("target directory is required")?;
        let python_version: PythonVersion = self
            .python_version
            .context("Python version is required")?
            .parse()?;
        let platform = Platform::from_bitness(self.bitness.unwrap_or(64));

        Ok(WheelSettings {
            requirements: self.requirements,
            wheel_globs: self.wheel_globs,
            extra_sources: self.extra_sources,
            target_dir,
            target: TargetEnvironment::new(python_version, platform),
            exclude: self.exclude,
            cache_root: self.cache_root.unwrap_or_else(CacheRoot::from_env),
            index_url: self
                .index_url
                .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string()),
        })
    }
}
