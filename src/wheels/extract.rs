//! Wheel extraction into a flat package directory.
//!
//! A wheel is unpacked into a scratch directory first. Its `<name>.data`
//! directory is folded back into the scratch root (`purelib`, `platlib` and
//! the legacy `data/Lib/site-packages` layout), then every other top-level
//! entry is merged into the target directory.

use super::exclude::ExcludeSet;
use crate::{
    bail,
    error::{Error, ErrorExt, Result},
    utils::fs::merge_dir_to,
};
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};
use zip::ZipArchive;

/// Prefix used for exclusion matching when the target directory has no name.
const DEFAULT_PACKAGE_DIR: &str = "pkgs";

/// Extract importable modules from a wheel into `target_dir`.
///
/// Exclusion patterns are matched against `<target_dir name>/<entry path>`.
/// The scratch directory is removed whether or not extraction succeeds.
/// Runs on a blocking thread; once started it always runs to completion.
pub async fn extract_wheel(
    whl_file: &Path,
    target_dir: &Path,
    exclude: Option<&ExcludeSet>,
) -> Result<()> {
    let whl_file = whl_file.to_path_buf();
    let target_dir = target_dir.to_path_buf();
    let exclude = exclude.filter(|e| !e.is_empty()).cloned();

    let task = tokio::task::spawn_blocking(move || {
        extract_wheel_blocking(
            &whl_file,
            &target_dir,
            exclude.as_ref(),
            &std::env::temp_dir(),
        )
    });
    match task.await {
        Ok(result) => result,
        Err(e) => bail!("Wheel extraction task panicked: {}", e),
    }
}

/// Extract on the current thread, using a scratch directory under `scratch_parent`.
pub(crate) fn extract_wheel_blocking(
    whl_file: &Path,
    target_dir: &Path,
    exclude: Option<&ExcludeSet>,
    scratch_parent: &Path,
) -> Result<()> {
    let scratch = tempfile::Builder::new()
        .prefix("kodegen-wheel-")
        .tempdir_in(scratch_parent)
        .fs_context("creating temporary directory", scratch_parent)?;

    // On error the TempDir guard removes the scratch directory when dropped.
    let scratch_path = scratch.path().to_path_buf();
    unpack(whl_file, &scratch_path, target_dir, exclude)?;
    fold_data_dirs(&scratch_path)?;
    let copied = copy_to_target(&scratch_path, target_dir)?;

    scratch
        .close()
        .fs_context("removing temporary directory", &scratch_path)?;

    if !copied {
        return Err(Error::EmptyWheel {
            wheel: whl_file.to_path_buf(),
        });
    }
    Ok(())
}

/// Unpack the archive into `scratch`, skipping excluded and unsafe entries.
fn unpack(
    whl_file: &Path,
    scratch: &Path,
    target_dir: &Path,
    exclude: Option<&ExcludeSet>,
) -> Result<()> {
    let package_dir = target_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_PACKAGE_DIR.to_string());

    let file = File::open(whl_file).fs_context("opening wheel", whl_file)?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        if let Some(exclude) = exclude {
            if exclude.is_excluded(&format!("{package_dir}/{}", entry.name())) {
                log::debug!("Excluding {} from {}", entry.name(), whl_file.display());
                continue;
            }
        }

        let Some(out_path) = entry.enclosed_name().map(|p| scratch.join(p)) else {
            log::warn!(
                "Skipping unsafe path {:?} in wheel {}",
                entry.name(),
                whl_file.display()
            );
            continue;
        };

        if entry.is_dir() {
            fs::create_dir_all(&out_path).fs_context("creating directory", &out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }
        let mut out = File::create(&out_path).fs_context("creating file", &out_path)?;
        io::copy(&mut entry, &mut out).fs_context("extracting file", &out_path)?;
    }
    Ok(())
}

/// Move files that belong at the top of the package tree out of `*.data`.
fn fold_data_dirs(scratch: &Path) -> Result<()> {
    for data_dir in sorted_entries(scratch)?
        .into_iter()
        .filter(|p| is_data_dir(p) && p.is_dir())
    {
        for scheme in ["purelib", "platlib"] {
            let scheme_dir = data_dir.join(scheme);
            if scheme_dir.is_dir() {
                merge_dir_to(&scheme_dir, scratch)?;
            }
        }

        // Some wheels ship extra packages under data/Lib/site-packages and
        // rely on the default install layout to land them in site-packages.
        // Matched case-insensitively, whatever the filesystem.
        let data = data_dir.join("data");
        if !data.is_dir() {
            continue;
        }
        for lib in sorted_entries(&data)? {
            if !(name_eq_ignore_case(&lib, "lib") && lib.is_dir()) {
                continue;
            }
            for site_packages in sorted_entries(&lib)? {
                if name_eq_ignore_case(&site_packages, "site-packages") && site_packages.is_dir() {
                    merge_dir_to(&site_packages, scratch)?;
                }
            }
        }
    }
    Ok(())
}

/// Merge every non-`.data` top-level entry into `target_dir`.
///
/// Returns whether anything was copied.
fn copy_to_target(scratch: &Path, target_dir: &Path) -> Result<bool> {
    fs::create_dir_all(target_dir).fs_context("creating target directory", target_dir)?;

    let mut copied_something = false;
    for src in sorted_entries(scratch)? {
        if is_data_dir(&src) {
            continue;
        }
        let Some(name) = src.file_name() else {
            continue;
        };
        let dst = target_dir.join(name);

        if src.is_dir() {
            if dst.is_file() {
                return Err(Error::DirectoryClashesWithFile { src, dst });
            }
            fs::create_dir_all(&dst).fs_context("creating directory", &dst)?;
            merge_dir_to(&src, &dst)?;
        } else {
            if dst.is_dir() {
                return Err(Error::FileClashesWithDirectory { src, dst });
            }
            fs::copy(&src, &dst).fs_context("copying file", &src)?;
        }
        copied_something = true;
    }
    Ok(copied_something)
}

fn is_data_dir(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "data")
}

fn name_eq_ignore_case(path: &Path, name: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.eq_ignore_ascii_case(name))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .fs_context("reading directory", dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .fs_context("reading directory entry", dir)?;
    entries.sort();
    Ok(entries)
}
