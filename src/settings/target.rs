//! Target interpreter and platform types.

use crate::error::{Error, Result};
use std::{fmt, str::FromStr};

/// Python version the installer will ship.
///
/// Only major and minor take part in tag matching; the micro version is kept
/// so messages can echo what the user configured.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: Option<u32>,
}

impl PythonVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            micro: None,
        }
    }

    /// `(major, minor)` for ordering comparisons.
    pub fn major_minor(&self) -> (u32, u32) {
        (self.major, self.minor)
    }
}

impl FromStr for PythonVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPythonVersion {
            version: s.to_string(),
        };
        let parts = s
            .trim()
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor)),
            [major, minor, micro] => Ok(Self {
                major: *major,
                minor: *minor,
                micro: Some(*micro),
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.micro {
            Some(micro) => write!(f, "{}.{}.{}", self.major, self.minor, micro),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

/// Windows platform the installer targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Platform {
    /// 32-bit Windows
    Win32,
    /// 64-bit Windows
    WinAmd64,
}

impl Platform {
    /// 64 selects `win_amd64`; anything else is treated as 32-bit.
    pub fn from_bitness(bitness: u32) -> Self {
        if bitness == 64 {
            Platform::WinAmd64
        } else {
            Platform::Win32
        }
    }

    /// Wheel platform tag for this platform.
    pub fn tag(&self) -> &'static str {
        match self {
            Platform::Win32 => "win32",
            Platform::WinAmd64 => "win_amd64",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Interpreter and platform one packaging run resolves wheels for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TargetEnvironment {
    pub python_version: PythonVersion,
    pub platform: Platform,
}

impl TargetEnvironment {
    pub fn new(python_version: PythonVersion, platform: Platform) -> Self {
        Self {
            python_version,
            platform,
        }
    }
}

impl fmt::Display for TargetEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Python {}, {}", self.python_version, self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_and_three_part_versions() {
        let v: PythonVersion = "3.8".parse().unwrap();
        assert_eq!(v, PythonVersion::new(3, 8));
        assert_eq!(v.to_string(), "3.8");

        let v: PythonVersion = "3.6.8".parse().unwrap();
        assert_eq!(v.major_minor(), (3, 6));
        assert_eq!(v.micro, Some(8));
        assert_eq!(v.to_string(), "3.6.8");
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["3", "", "3.x", "3.8.1.2", "three.eight"] {
            let err = bad.parse::<PythonVersion>().unwrap_err();
            assert!(matches!(err, Error::InvalidPythonVersion { .. }), "{bad}");
        }
    }

    #[test]
    fn bitness_selects_platform_tag() {
        assert_eq!(Platform::from_bitness(64).tag(), "win_amd64");
        assert_eq!(Platform::from_bitness(32).tag(), "win32");
    }
}
