//! Wheel filename parsing.
//!
//! `{distribution}-{version}[-{build}]-{interpreter}-{abi}-{platform}.whl`,
//! where each of the three tag fields may be a `.`-separated set of
//! alternatives (`py2.py3`).

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static WHEEL_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-([^-]+)-([^-]+)-([^-]+)\.whl$").expect("wheel tag pattern is valid")
});

/// The three (possibly compressed) tag fields of a wheel filename.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WheelTags<'a> {
    pub interpreter: &'a str,
    pub abi: &'a str,
    pub platform: &'a str,
}

impl<'a> WheelTags<'a> {
    /// Find the trailing `-interpreter-abi-platform.whl` segment.
    pub fn parse(filename: &'a str) -> Result<Self> {
        locate(filename).map(|(_, tags)| tags)
    }

    /// Every concrete `(interpreter, abi, platform)` combination.
    pub fn expand(&self) -> impl Iterator<Item = (&'a str, &'a str, &'a str)> + use<'a> {
        let (abis, platforms) = (self.abi, self.platform);
        self.interpreter.split('.').flat_map(move |interpreter| {
            abis.split('.').flat_map(move |abi| {
                platforms
                    .split('.')
                    .map(move |platform| (interpreter, abi, platform))
            })
        })
    }
}

/// Byte offset where the tag segment starts, and the tags themselves.
fn locate(filename: &str) -> Result<(usize, WheelTags<'_>)> {
    let caps = WHEEL_TAGS
        .captures(filename)
        .ok_or_else(|| Error::InvalidWheelFilename {
            filename: filename.to_string(),
        })?;
    let start = caps.get(0).map_or(0, |m| m.start());
    let field = |i| caps.get(i).map_or("", |m| m.as_str());
    Ok((
        start,
        WheelTags {
            interpreter: field(1),
            abi: field(2),
            platform: field(3),
        },
    ))
}

/// A fully parsed wheel filename.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WheelFilename {
    pub distribution: String,
    pub version: String,
    pub build_tag: Option<String>,
    pub interpreter: String,
    pub abi: String,
    pub platform: String,
}

impl WheelFilename {
    pub fn parse(filename: &str) -> Result<Self> {
        let (tag_start, tags) = locate(filename)?;
        let invalid = || Error::InvalidWheelFilename {
            filename: filename.to_string(),
        };

        let mut head = filename[..tag_start].split('-');
        let distribution = head.next().filter(|d| !d.is_empty()).ok_or_else(invalid)?;
        let version = head.next().filter(|v| !v.is_empty()).ok_or_else(invalid)?;
        let build_tag = head.next().map(str::to_string);
        if head.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            distribution: distribution.to_string(),
            version: version.to_string(),
            build_tag,
            interpreter: tags.interpreter.to_string(),
            abi: tags.abi.to_string(),
            platform: tags.platform.to_string(),
        })
    }
}

/// Distribution name of a wheel file: everything before the first `-`.
pub fn distribution_name(filename: &str) -> &str {
    filename.split('-').next().unwrap_or(filename)
}
