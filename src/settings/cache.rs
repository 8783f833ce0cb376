//! Cache root resolution.
//!
//! The cache root is resolved once per run from a snapshot of the process
//! environment and threaded explicitly to the locator.
//!
//! The cache is shared, mutable state: two runs pointed at the same root are
//! not synchronised with each other (no file locking). Downloads land in a
//! `.part` file and are renamed once verified, so concurrent runs fetching the
//! same wheel race only on the final rename.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the cache root.
pub const CACHE_DIR_ENV: &str = "KODEGEN_WHEEL_CACHE_DIR";

/// Directory name appended to the OS cache location.
const CACHE_DIR_NAME: &str = "kodegen-wheels";

/// Read access to the bits of the environment cache resolution needs.
pub trait EnvView {
    /// Value of an environment variable, if set.
    fn var(&self, key: &str) -> Option<String>;

    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// [`EnvView`] backed by the real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvView for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// Operating system family, which decides the default cache location.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OsKind {
    /// Linux and other Unix-likes (XDG)
    Linux,
    /// macOS
    MacOs,
    /// Windows
    Windows,
}

impl OsKind {
    /// The OS this process runs on.
    pub fn current() -> Self {
        if cfg!(windows) {
            OsKind::Windows
        } else if cfg!(target_os = "macos") {
            OsKind::MacOs
        } else {
            OsKind::Linux
        }
    }
}

/// Resolve the wheel cache root.
///
/// `KODEGEN_WHEEL_CACHE_DIR` wins when set and non-empty. Otherwise:
/// - Linux: `$XDG_CACHE_HOME/kodegen-wheels`, falling back to `~/.cache`
/// - macOS: `~/Library/Caches/kodegen-wheels`
/// - Windows: `%LOCALAPPDATA%\kodegen-wheels`, falling back to `~\AppData\Local`
pub fn resolve_cache_root(env: &impl EnvView, os: OsKind) -> PathBuf {
    if let Some(dir) = non_empty(env, CACHE_DIR_ENV) {
        return PathBuf::from(dir);
    }

    let home = env.home_dir().unwrap_or_else(|| PathBuf::from("."));
    let base = match os {
        OsKind::Linux => non_empty(env, "XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".cache")),
        OsKind::MacOs => home.join("Library").join("Caches"),
        OsKind::Windows => non_empty(env, "LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("AppData").join("Local")),
    };
    base.join(CACHE_DIR_NAME)
}

fn non_empty(env: &impl EnvView, key: &str) -> Option<String> {
    env.var(key).filter(|v| !v.is_empty())
}

/// Root of the on-disk wheel cache.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CacheRoot(PathBuf);

impl CacheRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Resolve from the current process environment.
    pub fn from_env() -> Self {
        Self(resolve_cache_root(&ProcessEnv, OsKind::current()))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Directory holding wheels downloaded for one release.
    pub fn release_dir(&self, name: &str, version: &str) -> PathBuf {
        self.0.join("pypi").join(name).join(version)
    }
}
