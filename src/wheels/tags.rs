//! Wheel tag compatibility scoring.
//!
//! The target's acceptable `(interpreter, abi, platform)` triples are
//! enumerated once, most specific first, and flattened into a single rank per
//! triple. A wheel scores the best rank any expansion of its tags reaches;
//! 0 means incompatible. A single total order means two different triples
//! never tie.
//!
//! The enumeration follows the `packaging.tags` ordering for CPython on
//! Windows, without probing a running interpreter.

use super::filename::WheelTags;
use crate::{
    error::Result,
    settings::{Platform, PythonVersion, TargetEnvironment},
};
use std::{collections::HashMap, fmt};

/// One concrete `(interpreter, abi, platform)` tag combination.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TagTriple {
    pub interpreter: String,
    pub abi: String,
    pub platform: String,
}

impl TagTriple {
    pub fn new(interpreter: impl Into<String>, abi: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            abi: abi.into(),
            platform: platform.into(),
        }
    }
}

impl fmt::Display for TagTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.interpreter, self.abi, self.platform)
    }
}

/// Tags a CPython interpreter of `python_version` on `platform` accepts,
/// ordered from most to least specific.
pub fn compatible_tags(python_version: PythonVersion, platform: Platform) -> Vec<TagTriple> {
    let (major, minor) = python_version.major_minor();
    let platform = platform.tag();
    let interpreter = format!("cp{major}{minor}");

    // The pymalloc ABI flag was dropped in Python 3.8.
    let cpython_abi = if (major, minor) < (3, 8) {
        format!("{interpreter}m")
    } else {
        interpreter.clone()
    };

    let mut tags = vec![
        TagTriple::new(&interpreter, cpython_abi, platform),
        TagTriple::new(&interpreter, "abi3", platform),
        TagTriple::new(&interpreter, "none", platform),
    ];

    // abi3 wheels built for older minors down to 3.2, where the stable ABI began
    tags.extend(
        (2..minor)
            .rev()
            .map(|older| TagTriple::new(format!("cp{major}{older}"), "abi3", platform)),
    );

    let py_interpreters: Vec<String> = [format!("py{major}{minor}"), format!("py{major}")]
        .into_iter()
        .chain((0..minor).rev().map(|older| format!("py{major}{older}")))
        .collect();

    tags.extend(
        py_interpreters
            .iter()
            .map(|py| TagTriple::new(py, "none", platform)),
    );
    tags.extend(
        py_interpreters
            .iter()
            .map(|py| TagTriple::new(py, "none", "any")),
    );

    tags
}

/// Scores wheel filenames for one target environment.
///
/// Higher scores mean more specific (preferred) tags; 0 means incompatible.
#[derive(Clone, Debug)]
pub struct CompatibilityScorer {
    target: TargetEnvironment,
    priorities: HashMap<TagTriple, u32>,
}

impl CompatibilityScorer {
    pub fn new(target: TargetEnvironment) -> Self {
        let tags = compatible_tags(target.python_version, target.platform);
        let mut priorities = HashMap::with_capacity(tags.len());
        // Earliest yielded tag ends up with the highest rank.
        for (rank, tag) in (1u32..).zip(tags.into_iter().rev()) {
            priorities.insert(tag, rank);
        }

        Self { target, priorities }
    }

    pub fn target(&self) -> &TargetEnvironment {
        &self.target
    }

    /// Rank of a single concrete triple, 0 when unknown.
    pub fn rank(&self, interpreter: &str, abi: &str, platform: &str) -> u32 {
        self.priorities
            .get(&TagTriple::new(interpreter, abi, platform))
            .copied()
            .unwrap_or(0)
    }

    /// How suitable a wheel is for the target.
    ///
    /// Fails if the filename has no `-interpreter-abi-platform.whl` segment.
    pub fn score(&self, whl_filename: &str) -> Result<u32> {
        let tags = WheelTags::parse(whl_filename)?;
        Ok(tags
            .expand()
            .map(|(interpreter, abi, platform)| self.rank(interpreter, abi, platform))
            .max()
            .unwrap_or(0))
    }

    pub fn is_compatible(&self, whl_filename: &str) -> Result<bool> {
        Ok(self.score(whl_filename)? > 0)
    }
}
