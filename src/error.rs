//! Error types for wheel resolution and extraction.
//!
//! Every variant carries enough context (wheel filename, distribution name,
//! paths, target environment) to produce an actionable message without
//! re-running the packaging step. All errors abort the whole run.

use std::{fmt::Display, path::PathBuf};
use thiserror::Error;

/// Result type alias for wheel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for all wheel operations
#[derive(Error, Debug)]
pub enum Error {
    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// Filesystem error with the operation and path that failed
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being attempted
        context: &'static str,
        /// Path the operation failed on
        path: PathBuf,
        /// Underlying IO error
        error: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Requirement string is not of the form `name==version`
    #[error("Requirement {requirement:?} did not match name==version")]
    MalformedRequirement {
        /// The offending requirement string
        requirement: String,
    },

    /// Target Python version could not be parsed
    #[error("Invalid Python version {version:?}: expected MAJOR.MINOR[.MICRO]")]
    InvalidPythonVersion {
        /// The offending version string
        version: String,
    },

    /// Wheel filename has no `-interpreter-abi-platform.whl` tag segment
    #[error("Failed to find wheel tag in {filename:?}")]
    InvalidWheelFilename {
        /// The offending filename
        filename: String,
    },

    /// Glob pattern is syntactically invalid
    #[error("Invalid glob pattern {pattern}: {source}")]
    InvalidGlob {
        /// The offending pattern
        pattern: String,
        /// Parser error
        #[source]
        source: glob::PatternError,
    },

    /// Glob pattern matched no files
    #[error("Glob path {pattern} does not match any files")]
    GlobNoMatch {
        /// The pattern that matched nothing
        pattern: String,
    },

    /// Exclusion pattern could not be compiled
    #[error("Invalid exclude pattern {pattern}: {source}")]
    InvalidExcludePattern {
        /// The offending pattern
        pattern: String,
        /// Glob compilation error
        #[source]
        source: globset::Error,
    },

    /// Package index has no project of this name
    #[error("No package named {name} found on the package index")]
    NoSuchPackage {
        /// Distribution name
        name: String,
    },

    /// Package exists but has no release with this version
    #[error("No release {version} for package {name}")]
    NoSuchRelease {
        /// Distribution name
        name: String,
        /// Requested version
        version: String,
    },

    /// No wheel for the requirement is compatible with the target
    #[error("No compatible wheels found for {name} {version} (Python {python_version}, {platform})")]
    NoCompatibleWheel {
        /// Distribution name
        name: String,
        /// Requested version
        version: String,
        /// Target Python version
        python_version: String,
        /// Target platform tag
        platform: String,
    },

    /// Downloaded file does not match its published digest
    #[error("Downloaded wheel corrupted: {url} (expected {algorithm} {expected}, got {actual})")]
    CorruptDownload {
        /// Download URL
        url: String,
        /// Digest algorithm name
        algorithm: &'static str,
        /// Published digest
        expected: String,
        /// Digest of the downloaded bytes
        actual: String,
    },

    /// Two wheels provide the same distribution
    #[error("Multiple wheels specified for {distribution}:\n  {}\n  {}", .previous.display(), .current.display())]
    DuplicateDistribution {
        /// Distribution name
        distribution: String,
        /// Wheel registered first
        previous: PathBuf,
        /// Wheel that conflicts with it
        current: PathBuf,
    },

    /// Local wheel cannot be used with the target environment
    #[error("Wheel {wheel} is not compatible with Python {python_version}, {platform}")]
    IncompatibleWheel {
        /// Wheel filename
        wheel: String,
        /// Target Python version
        python_version: String,
        /// Target platform tag
        platform: String,
    },

    /// A source directory would replace a destination file
    #[error("Directory {} clashes with file {}", .src.display(), .dst.display())]
    DirectoryClashesWithFile {
        /// Source directory
        src: PathBuf,
        /// Existing destination file
        dst: PathBuf,
    },

    /// A source file would replace a destination directory
    #[error("File {} clashes with directory {}", .src.display(), .dst.display())]
    FileClashesWithDirectory {
        /// Source file
        src: PathBuf,
        /// Existing destination directory
        dst: PathBuf,
    },

    /// Wheel contributed nothing outside its `.data` directory
    #[error("Did not find any files to extract from wheel {}", .wheel.display())]
    EmptyWheel {
        /// Wheel path
        wheel: PathBuf,
    },

    /// Zip archive errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// HTTP errors talking to the package index
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid index URL
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Index response could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Run cancelled between wheels
    #[error("Wheel collection cancelled")]
    Cancelled,

    /// Generic error
    #[error("{0}")]
    GenericError(String),
}

/// Broad classification of an [`Error`], used by callers to word messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    /// Caller-correctable input: requirement strings, globs, filenames
    Configuration,
    /// Package, release or compatible wheel not found
    Resolution,
    /// Download failed its digest check
    Integrity,
    /// Duplicate or incompatible wheels in one run
    Consistency,
    /// Malformed wheel or unresolvable layout collision
    Structural,
    /// Filesystem or network failure
    Io,
    /// Cancelled by the caller
    Cancelled,
}

impl Error {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Context(_, inner) => inner.category(),
            Error::MalformedRequirement { .. }
            | Error::InvalidPythonVersion { .. }
            | Error::InvalidWheelFilename { .. }
            | Error::InvalidGlob { .. }
            | Error::GlobNoMatch { .. }
            | Error::InvalidExcludePattern { .. } => ErrorCategory::Configuration,
            Error::NoSuchPackage { .. }
            | Error::NoSuchRelease { .. }
            | Error::NoCompatibleWheel { .. } => ErrorCategory::Resolution,
            Error::CorruptDownload { .. } => ErrorCategory::Integrity,
            Error::DuplicateDistribution { .. } | Error::IncompatibleWheel { .. } => {
                ErrorCategory::Consistency
            }
            Error::DirectoryClashesWithFile { .. }
            | Error::FileClashesWithDirectory { .. }
            | Error::EmptyWheel { .. }
            | Error::Zip(_) => ErrorCategory::Structural,
            Error::Cancelled => ErrorCategory::Cancelled,
            Error::Fs { .. }
            | Error::IoError(_)
            | Error::Http(_)
            | Error::Url(_)
            | Error::Json(_)
            | Error::GenericError(_) => ErrorCategory::Io,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self.category() {
            ErrorCategory::Configuration => {
                vec!["Check the requirement, glob and exclude settings for typos".to_string()]
            }
            ErrorCategory::Resolution => vec![
                "Check the package name and version on the package index".to_string(),
                "Provide a compatible wheel through an extra source directory".to_string(),
            ],
            ErrorCategory::Integrity => {
                vec!["Run again; the corrupt download has been removed".to_string()]
            }
            ErrorCategory::Consistency => {
                vec!["Include each distribution only once, built for the target Python".to_string()]
            }
            ErrorCategory::Structural => {
                vec!["Inspect the wheel contents; it may be malformed".to_string()]
            }
            ErrorCategory::Io | ErrorCategory::Cancelled => {
                vec!["Check the error message above for specific details".to_string()]
            }
        }
    }
}

/// Attach a human readable context to an error.
pub trait Context<T> {
    /// Wrap the error with a fixed context message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wrap the error with a lazily built context message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Attach the failing operation and path to IO errors.
pub trait ErrorExt<T> {
    /// Convert an IO error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Return early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
