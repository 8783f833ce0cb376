//! File system utilities for merging extracted wheels.
//!
//! These run on blocking threads (see [`crate::wheels::extract`]), so they use
//! `std::fs` directly.

use crate::error::{Error, ErrorExt, Result};
use std::path::Path;

/// Merge all files from one directory into another.
///
/// Subdirectories are merged recursively. Files in `src` overwrite files of
/// the same name in `dst`. A directory meeting a file (either way round) is a
/// [`Error::DirectoryClashesWithFile`] / [`Error::FileClashesWithDirectory`]
/// and is never resolved silently.
pub fn merge_dir_to(src: &Path, dst: &Path) -> Result<()> {
    for entry in std::fs::read_dir(src).fs_context("reading directory", src)? {
        let entry = entry.fs_context("reading directory entry", src)?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            if dst_path.is_dir() {
                merge_dir_to(&src_path, &dst_path)?;
            } else if dst_path.is_file() {
                return Err(Error::DirectoryClashesWithFile {
                    src: src_path,
                    dst: dst_path,
                });
            } else {
                copy_dir(&src_path, &dst_path)?;
            }
        } else {
            if dst_path.is_dir() {
                return Err(Error::FileClashesWithDirectory {
                    src: src_path,
                    dst: dst_path,
                });
            }
            std::fs::copy(&src_path, &dst_path).fs_context("copying file", &src_path)?;
        }
    }
    Ok(())
}

/// Recursively copies a directory to a destination that does not exist yet,
/// creating any parent directories of the destination as necessary.
pub fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::GenericError(format!(
            "{} is not a directory",
            from.display()
        )));
    }
    if to.exists() {
        return Err(Error::GenericError(format!(
            "{} already exists",
            to.display()
        )));
    }

    for entry in walkdir::WalkDir::new(from) {
        let entry = entry
            .map_err(std::io::Error::from)
            .fs_context("walking directory", from)?;
        let rel_path = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::GenericError(format!("{}: {e}", entry.path().display())))?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
        } else {
            std::fs::copy(entry.path(), &dest_path).fs_context("copying file", entry.path())?;
        }
    }
    Ok(())
}
