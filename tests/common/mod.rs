//! Shared helpers for the integration tests.

#![allow(dead_code)]

use kodegen_bundler_wheels::{
    Error, Result,
    settings::WheelSettingsBuilder,
    wheels::{
        IndexFile, IndexProject, PackageIndex,
        index::Digests,
    },
};
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    fs,
    io::{Cursor, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Zip `entries` (path, contents) into an in-memory wheel.
pub fn wheel_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Write a wheel named `filename` into `dir`, creating `dir` if needed.
pub fn write_wheel(dir: &Path, filename: &str, entries: &[(&str, &str)]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(filename);
    fs::write(&path, wheel_bytes(entries)).unwrap();
    path
}

/// Minimal pure-Python wheel contents for `module`.
pub fn module_entries(module: &str, dist_info: &str) -> Vec<(String, String)> {
    vec![
        (format!("{module}.py"), format!("# {module}\n")),
        (format!("{dist_info}/METADATA"), "Metadata-Version: 2.1\n".to_string()),
    ]
}

pub fn as_refs(entries: &[(String, String)]) -> Vec<(&str, &str)> {
    entries
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Settings for a run targeting `python_version` on 64-bit Windows, with the
/// package directory and cache under `root`.
pub fn settings(root: &Path, python_version: &str) -> WheelSettingsBuilder {
    WheelSettingsBuilder::new()
        .target_dir(root.join("pkgs"))
        .cache_root(root.join("cache"))
        .python_version(python_version)
        .bitness(64)
}

/// In-memory package index.
#[derive(Default)]
pub struct FakeIndex {
    projects: HashMap<String, IndexProject>,
    files: HashMap<String, Vec<u8>>,
    downloads: AtomicUsize,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project release with no files.
    pub fn add_release(&mut self, name: &str, version: &str) {
        self.projects
            .entry(name.to_string())
            .or_default()
            .releases
            .entry(version.to_string())
            .or_default();
    }

    /// Publish `bytes` as `filename` with the given sha256 digest.
    pub fn add_file(
        &mut self,
        name: &str,
        version: &str,
        filename: &str,
        bytes: Vec<u8>,
        sha256: Option<String>,
    ) {
        let url = format!("https://files.example/{name}/{version}/{filename}");
        let package_type = if filename.ends_with(".whl") {
            "bdist_wheel"
        } else {
            "sdist"
        };
        self.add_release(name, version);
        self.projects
            .get_mut(name)
            .unwrap()
            .releases
            .get_mut(version)
            .unwrap()
            .push(IndexFile {
                filename: filename.to_string(),
                url: url.clone(),
                package_type: package_type.to_string(),
                digests: Digests { sha256, md5: None },
                md5_digest: None,
            });
        self.files.insert(url, bytes);
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

impl PackageIndex for FakeIndex {
    async fn project(&self, name: &str) -> Result<Option<IndexProject>> {
        Ok(self.projects.get(name).cloned())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let bytes = self
            .files
            .get(url)
            .ok_or_else(|| Error::GenericError(format!("No such file on fake index: {url}")))?;
        tokio::fs::write(dest, bytes).await?;
        Ok(())
    }
}
