//! Resolve one `name==version` requirement to a wheel file.
//!
//! Three tiers are consulted in order and the first hit wins:
//! 1. extra source directories, in the configured order
//! 2. the download cache
//! 3. the package index (downloaded into the cache)

use super::{
    index::{IndexFile, PackageIndex},
    requirement::Requirement,
    tags::CompatibilityScorer,
};
use crate::{
    error::{Error, ErrorExt, Result},
    settings::CacheRoot,
    utils::checksum::file_digest,
};
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// Kind of distribution file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PackageType {
    Wheel,
    Other,
}

/// A named distribution file available from some source.
pub trait Release {
    fn filename(&self) -> &str;
    fn package_type(&self) -> PackageType;
}

impl<R: Release + ?Sized> Release for &R {
    fn filename(&self) -> &str {
        (**self).filename()
    }

    fn package_type(&self) -> PackageType {
        (**self).package_type()
    }
}

impl Release for IndexFile {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn package_type(&self) -> PackageType {
        if self.package_type == "bdist_wheel" {
            PackageType::Wheel
        } else {
            PackageType::Other
        }
    }
}

/// A file found in a local directory (extra source or cache).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalRelease {
    path: PathBuf,
    filename: String,
}

impl LocalRelease {
    pub fn new(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, filename }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl Release for LocalRelease {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn package_type(&self) -> PackageType {
        if self.filename.ends_with(".whl") {
            PackageType::Wheel
        } else {
            PackageType::Other
        }
    }
}

/// Return the most specific compatible wheel, `None` if none is compatible.
///
/// Non-wheel files and wheels without a parseable tag segment are ignored.
/// Among equal scores the first one wins.
pub fn pick_best_wheel<R: Release>(
    scorer: &CompatibilityScorer,
    releases: impl IntoIterator<Item = R>,
) -> Option<R> {
    let mut best: Option<(u32, R)> = None;
    for release in releases {
        if release.package_type() != PackageType::Wheel {
            continue;
        }
        let score = match scorer.score(release.filename()) {
            Ok(score) => score,
            Err(e) => {
                log::debug!("Skipping {}: {}", release.filename(), e);
                continue;
            }
        };
        log::debug!("Wheel {} scores {}", release.filename(), score);
        if score == 0 {
            continue;
        }
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, release));
        }
    }
    best.map(|(_, release)| release)
}

/// Finds a compatible wheel for one requirement.
pub struct WheelLocator<'a, I> {
    requirement: Requirement,
    scorer: &'a CompatibilityScorer,
    extra_sources: &'a [PathBuf],
    cache_root: &'a CacheRoot,
    index: &'a I,
}

impl<'a, I: PackageIndex> WheelLocator<'a, I> {
    /// Fails with [`Error::MalformedRequirement`] unless `requirement` is `name==version`.
    pub fn new(
        requirement: &str,
        scorer: &'a CompatibilityScorer,
        extra_sources: &'a [PathBuf],
        cache_root: &'a CacheRoot,
        index: &'a I,
    ) -> Result<Self> {
        Ok(Self {
            requirement: requirement.parse()?,
            scorer,
            extra_sources,
            cache_root,
            index,
        })
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Find and return a compatible wheel.
    pub async fn fetch(&self) -> Result<PathBuf> {
        if let Some(path) = self.check_extra_sources().await? {
            log::info!("Using wheel from extra directory: {}", path.display());
            return Ok(path);
        }

        if let Some(path) = self.check_cache().await? {
            log::info!("Using cached wheel: {}", path.display());
            return Ok(path);
        }

        self.get_from_index().await
    }

    /// Best wheel in the first extra source directory that has one.
    pub async fn check_extra_sources(&self) -> Result<Option<PathBuf>> {
        let prefix = self.requirement.filename_prefix();
        for source in self.extra_sources {
            let candidates = list_dir(source)
                .await?
                .into_iter()
                .filter(|release| release.filename().starts_with(&prefix));
            if let Some(release) = pick_best_wheel(self.scorer, candidates) {
                return Ok(Some(release.into_path()));
            }
        }
        Ok(None)
    }

    /// Best wheel previously downloaded for this release.
    pub async fn check_cache(&self) -> Result<Option<PathBuf>> {
        let release_dir = self
            .cache_root
            .release_dir(&self.requirement.name, &self.requirement.version);
        if !tokio::fs::metadata(&release_dir)
            .await
            .is_ok_and(|m| m.is_dir())
        {
            return Ok(None);
        }

        let candidates = list_dir(&release_dir).await?;
        Ok(pick_best_wheel(self.scorer, candidates).map(LocalRelease::into_path))
    }

    /// Download the best compatible wheel from the index into the cache.
    pub async fn get_from_index(&self) -> Result<PathBuf> {
        let Requirement { name, version } = &self.requirement;

        let project = self
            .index
            .project(name)
            .await?
            .ok_or_else(|| Error::NoSuchPackage { name: name.clone() })?;
        let files = project.release(version).ok_or_else(|| Error::NoSuchRelease {
            name: name.clone(),
            version: version.clone(),
        })?;
        let best = pick_best_wheel(self.scorer, files).ok_or_else(|| {
            let target = self.scorer.target();
            Error::NoCompatibleWheel {
                name: name.clone(),
                version: version.clone(),
                python_version: target.python_version.to_string(),
                platform: target.platform.to_string(),
            }
        })?;

        if Path::new(&best.filename).file_name() != Some(OsStr::new(&best.filename)) {
            return Err(Error::InvalidWheelFilename {
                filename: best.filename.clone(),
            });
        }

        let download_to = self.cache_root.release_dir(name, version);
        tokio::fs::create_dir_all(&download_to)
            .await
            .fs_context("creating cache directory", &download_to)?;
        let target = download_to.join(&best.filename);
        let partial = download_to.join(format!("{}.part", best.filename));

        log::info!("Downloading wheel: {}", best.url);
        if let Err(e) = self.index.download(&best.url, &partial).await {
            remove_partial(&partial).await;
            return Err(e);
        }

        match best.expected_digest() {
            Some((algorithm, expected)) => {
                let actual = match file_digest(&partial, algorithm).await {
                    Ok(actual) => actual,
                    Err(e) => {
                        remove_partial(&partial).await;
                        return Err(e);
                    }
                };
                if !actual.eq_ignore_ascii_case(expected) {
                    remove_partial(&partial).await;
                    return Err(Error::CorruptDownload {
                        url: best.url.clone(),
                        algorithm: algorithm.name(),
                        expected: expected.to_string(),
                        actual,
                    });
                }
            }
            None => log::warn!("No digest published for {}; not verified", best.url),
        }

        tokio::fs::rename(&partial, &target)
            .await
            .fs_context("moving download into cache", &target)?;
        Ok(target)
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove partial download {}: {}", path.display(), e);
        }
    }
}

/// Every file in `dir`, sorted by name so ties resolve the same way each run.
async fn list_dir(dir: &Path) -> Result<Vec<LocalRelease>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .fs_context("reading wheel directory", dir)?;
    let mut releases = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading wheel directory", dir)?
    {
        releases.push(LocalRelease::new(entry.path()));
    }
    releases.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(releases)
}
