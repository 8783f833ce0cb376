//! Collect every wheel of a packaging run into one package directory.

use super::{
    exclude::ExcludeSet,
    extract::extract_wheel,
    filename::distribution_name,
    index::{PackageIndex, PyPiIndex},
    locator::WheelLocator,
    tags::CompatibilityScorer,
};
use crate::{
    error::{Context, Error, Result},
    settings::WheelSettings,
};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Drives location and extraction for a whole run.
///
/// Requirements are processed before globs, so a pinned requirement always
/// claims its distribution before a local wheel of the same name is seen.
/// Any error aborts the run; the target directory may then hold the wheels
/// merged so far and should be discarded.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_wheels::{WheelGetter, settings::WheelSettingsBuilder};
///
/// # async fn example() -> kodegen_bundler_wheels::Result<()> {
/// let settings = WheelSettingsBuilder::new()
///     .requirements(vec!["astsearch==0.1.3".into()])
///     .target_dir("build/nsis/pkgs")
///     .python_version("3.8")
///     .bitness(64)
///     .build()?;
///
/// let mut getter = WheelGetter::from_settings(settings)?;
/// getter.get_all().await?;
/// # Ok(())
/// # }
/// ```
pub struct WheelGetter<I = PyPiIndex> {
    settings: WheelSettings,
    scorer: CompatibilityScorer,
    exclude: Option<ExcludeSet>,
    index: I,
    cancel: CancellationToken,
    /// Normalized distribution name -> (name as given, wheel path)
    got_distributions: IndexMap<String, (String, PathBuf)>,
}

impl WheelGetter<PyPiIndex> {
    /// Getter that downloads from the index configured in `settings`.
    pub fn from_settings(settings: WheelSettings) -> Result<Self> {
        let index = PyPiIndex::new(settings.index_url())?;
        Self::new(settings, index)
    }
}

impl<I: PackageIndex> WheelGetter<I> {
    pub fn new(settings: WheelSettings, index: I) -> Result<Self> {
        let scorer = CompatibilityScorer::new(*settings.target());
        let exclude = if settings.exclude().is_empty() {
            None
        } else {
            Some(ExcludeSet::new(settings.exclude())?)
        };

        Ok(Self {
            settings,
            scorer,
            exclude,
            index,
            cancel: CancellationToken::new(),
            got_distributions: IndexMap::new(),
        })
    }

    pub fn scorer(&self) -> &CompatibilityScorer {
        &self.scorer
    }

    /// Distributions collected so far, in the order they were added.
    pub fn distributions(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.got_distributions
            .values()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Collect requirements, then glob matches.
    pub async fn get_all(&mut self) -> Result<()> {
        self.get_requirements().await?;
        self.get_globs().await
    }

    /// Like [`get_all`](Self::get_all), stopping between wheels once `token`
    /// is cancelled. A wheel whose extraction has started is finished first.
    pub async fn get_all_with_cancel(&mut self, token: &CancellationToken) -> Result<()> {
        self.cancel = token.clone();
        self.get_all().await
    }

    /// Locate and extract every pinned requirement.
    pub async fn get_requirements(&mut self) -> Result<()> {
        for requirement in self.settings.requirements() {
            self.check_cancelled()?;

            let locator = WheelLocator::new(
                requirement,
                &self.scorer,
                self.settings.extra_sources(),
                self.settings.cache_root(),
                &self.index,
            )?;
            let name = locator.requirement().name.clone();
            let whl_file = locator.fetch().await?;
            if let Some((_, previous)) = self.got_distributions.get(&normalize_name(&name)) {
                return Err(Error::DuplicateDistribution {
                    distribution: name,
                    previous: previous.clone(),
                    current: whl_file,
                });
            }

            extract_wheel(&whl_file, self.settings.target_dir(), self.exclude.as_ref())
                .await
                .with_context(|| format!("Failed to extract {}", whl_file.display()))?;
            self.got_distributions
                .insert(normalize_name(&name), (name, whl_file));
        }
        Ok(())
    }

    /// Validate and extract every wheel the configured globs match.
    pub async fn get_globs(&mut self) -> Result<()> {
        let patterns = self.settings.wheel_globs().to_vec();
        for pattern in &patterns {
            let paths = expand_glob(pattern)?;
            if paths.is_empty() {
                return Err(Error::GlobNoMatch {
                    pattern: pattern.clone(),
                });
            }

            for path in paths {
                self.check_cancelled()?;
                log::info!(
                    "Collecting wheel file: {} (from: {})",
                    path.file_name()
                        .map(|n| n.to_string_lossy())
                        .unwrap_or_default(),
                    pattern
                );
                self.validate_wheel(&path)?;
                extract_wheel(&path, self.settings.target_dir(), self.exclude.as_ref())
                    .await
                    .with_context(|| format!("Failed to extract {}", path.display()))?;
            }
        }
        Ok(())
    }

    /// Check that a local wheel can be included, then record it.
    ///
    /// Fails if a wheel for the same distribution was already included, if
    /// the filename has no tag segment, or if the wheel does not fit the
    /// target environment.
    pub fn validate_wheel(&mut self, whl_path: &Path) -> Result<()> {
        let wheel_name = whl_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let distribution = distribution_name(&wheel_name).to_string();
        let key = normalize_name(&distribution);

        if let Some((_, previous)) = self.got_distributions.get(&key) {
            return Err(Error::DuplicateDistribution {
                distribution,
                previous: previous.clone(),
                current: whl_path.to_path_buf(),
            });
        }

        if !self.scorer.is_compatible(&wheel_name)? {
            let target = self.scorer.target();
            return Err(Error::IncompatibleWheel {
                wheel: wheel_name,
                python_version: target.python_version.to_string(),
                platform: target.platform.to_string(),
            });
        }

        self.got_distributions
            .insert(key, (distribution, whl_path.to_path_buf()));
        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|source| Error::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })?;

    entries
        .map(|entry| {
            entry.map_err(|e| Error::Fs {
                context: "expanding glob",
                path: e.path().to_path_buf(),
                error: e.into(),
            })
        })
        .collect()
}

/// Registry key: case-folded, with runs of `-`, `_` and `.` collapsed to `-`,
/// so `pywin32-ctypes` and a `pywin32_ctypes-*.whl` file are the same
/// distribution.
fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}
