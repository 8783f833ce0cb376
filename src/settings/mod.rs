//! Configuration for one wheel collection run.
//!
//! [`WheelSettings`] is constructed through [`WheelSettingsBuilder`] and is
//! immutable for the duration of a run.

mod builder;
mod cache;
mod core;
mod target;

pub use builder::WheelSettingsBuilder;
pub use cache::{CACHE_DIR_ENV, CacheRoot, EnvView, OsKind, ProcessEnv, resolve_cache_root};
pub use self::core::{DEFAULT_INDEX_URL, WheelSettings};
pub use target::{Platform, PythonVersion, TargetEnvironment};
