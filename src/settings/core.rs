//! Core WheelSettings struct.

use super::{CacheRoot, TargetEnvironment};
use std::path::{Path, PathBuf};

/// Package index queried when a wheel is neither in an extra source nor cached.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

/// Settings for one wheel collection run.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_wheels::settings::WheelSettingsBuilder;
///
/// # fn example() -> kodegen_bundler_wheels::Result<()> {
/// let settings = WheelSettingsBuilder::new()
///     .requirements(vec!["astsearch==0.1.3".into()])
///     .wheel_globs(vec!["wheels/*.whl".into()])
///     .target_dir("build/nsis/pkgs")
///     .python_version("3.8.10")
///     .bitness(64)
///     .build()?;
/// assert_eq!(settings.target().platform.tag(), "win_amd64");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct WheelSettings {
    /// `name==version` requirement strings, resolved first.
    pub(super) requirements: Vec<String>,

    /// Glob patterns naming local wheel files, collected after requirements.
    pub(super) wheel_globs: Vec<String>,

    /// Local directories searched before the cache and the index.
    pub(super) extra_sources: Vec<PathBuf>,

    /// Directory the wheels' importable contents are merged into.
    pub(super) target_dir: PathBuf,

    /// Interpreter and platform wheels must be compatible with.
    pub(super) target: TargetEnvironment,

    /// Glob-style paths, relative to the parent of `target_dir`, to leave out.
    pub(super) exclude: Vec<String>,

    /// Root of the download cache.
    pub(super) cache_root: CacheRoot,

    /// Base URL of the package index.
    pub(super) index_url: String,
}

impl WheelSettings {
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    pub fn wheel_globs(&self) -> &[String] {
        &self.wheel_globs
    }

    pub fn extra_sources(&self) -> &[PathBuf] {
        &self.extra_sources
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn target(&self) -> &TargetEnvironment {
        &self.target
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn cache_root(&self) -> &CacheRoot {
        &self.cache_root
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }
}
