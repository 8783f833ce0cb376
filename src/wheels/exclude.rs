//! Glob-style exclusion patterns for wheel extraction.
//!
//! Patterns use shell wildcard semantics where `*` also crosses `/`. A pattern
//! that does not end in `*` additionally excludes everything below a
//! directory of that name, so `pkgs/foo/bar` drops both `pkgs/foo/bar` and
//! `pkgs/foo/bar/**`.

use crate::error::{Error, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;

/// A compiled set of exclusion patterns.
#[derive(Clone, Debug)]
pub struct ExcludeSet {
    globs: GlobSet,
}

impl Default for ExcludeSet {
    fn default() -> Self {
        Self {
            globs: GlobSet::empty(),
        }
    }
}

impl ExcludeSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut expanded = BTreeSet::new();
        for pattern in patterns {
            let pattern = normalize_path(pattern.as_ref());
            if !pattern.ends_with('*') {
                let suffix = if pattern.ends_with('/') { "*" } else { "/*" };
                expanded.insert(format!("{pattern}{suffix}"));
            }
            expanded.insert(pattern);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in expanded {
            let glob = GlobBuilder::new(&pattern)
                .literal_separator(false)
                .backslash_escape(false)
                .build()
                .map_err(|source| Error::InvalidExcludePattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }
        let globs = builder.build().map_err(|source| Error::InvalidExcludePattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            source,
        })?;

        Ok(Self { globs })
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    /// Whether `path` matches any pattern. Backslashes count as separators.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.globs.is_match(normalize_path(path))
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
