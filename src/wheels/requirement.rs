//! Version-pinned requirements.

use crate::error::{Error, Result};
use regex::Regex;
use std::{fmt, str::FromStr, sync::LazyLock};

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\d.]+").expect("filename escape pattern is valid"));

/// A `name==version` requirement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Requirement {
    pub name: String,
    pub version: String,
}

impl Requirement {
    /// Prefix every wheel for this release starts with, `{name}-{version}-`,
    /// with the escaping wheel filenames apply to both components.
    pub fn filename_prefix(&self) -> String {
        format!(
            "{}-{}-",
            UNSAFE_FILENAME_CHARS.replace_all(&self.name, "_"),
            UNSAFE_FILENAME_CHARS.replace_all(&self.version, "_"),
        )
    }
}

impl FromStr for Requirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::MalformedRequirement {
            requirement: s.to_string(),
        };
        if s.matches("==").count() != 1 {
            return Err(malformed());
        }
        let (name, version) = s.split_once("==").ok_or_else(malformed)?;
        let (name, version) = (name.trim(), version.trim());
        if name.is_empty() || version.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}
