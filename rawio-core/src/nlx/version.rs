//! Application versions written by Neuralynx acquisition software
//!
//! Versions are dotted release numbers with an optional development marker
//! (`6.4.1.dev0`). Trailing zero components are insignificant and a
//! development build sorts before its release.

use crate::{RawIoError, Result};
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

/// Parsed application version
#[derive(Debug, Clone, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", try_from = "String")
)]
pub struct AppVersion {
    release: Vec<u32>,
    dev: Option<u32>,
}

impl AppVersion {
    /// Version from release components
    pub fn new(release: &[u32]) -> Self {
        Self {
            release: release.to_vec(),
            dev: None,
        }
    }

    /// Parse a version string
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || RawIoError::InvalidVersion(text.to_string());
        let trimmed = text.trim();
        let trimmed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let lower = trimmed.to_ascii_lowercase();
        let (release_part, dev) = match lower.find("dev") {
            Some(pos) => {
                let digits = &lower[pos + 3..];
                let dev = if digits.is_empty() {
                    0
                } else {
                    digits.parse::<u32>().map_err(|_| invalid())?
                };
                let release = lower[..pos].trim_end_matches(['.', '-', '_']);
                (release.to_string(), Some(dev))
            }
            None => (lower, None),
        };

        if release_part.is_empty() {
            return Err(invalid());
        }

        let release = release_part
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { release, dev })
    }

    /// Release components as written
    pub fn release(&self) -> &[u32] {
        &self.release
    }

    /// Development build number, if any
    pub fn dev(&self) -> Option<u32> {
        self.dev
    }

    /// True for development builds
    pub fn is_dev(&self) -> bool {
        self.dev.is_some()
    }

    fn component(&self, index: usize) -> u32 {
        self.release.get(index).copied().unwrap_or(0)
    }
}

impl Ord for AppVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        match (self.dev, other.dev) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}

impl PartialOrd for AppVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AppVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release = self
            .release
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
        match self.dev {
            Some(n) => write!(f, "{release}.dev{n}"),
            None => write!(f, "{release}"),
        }
    }
}

impl FromStr for AppVersion {
    type Err = RawIoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<AppVersion> for String {
    fn from(version: AppVersion) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for AppVersion {
    type Error = RawIoError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> AppVersion {
        AppVersion::parse(text).unwrap()
    }

    #[test]
    fn test_trailing_zeros_are_insignificant() {
        assert_eq!(v("2"), v("2.0"));
        assert_eq!(v("2.0"), v("2.0.0"));
        assert!(v("2.0.1") > v("2"));
    }

    #[test]
    fn test_dev_sorts_before_release() {
        assert!(v("6.4.1.dev0") < v("6.4.1"));
        assert!(v("6.4.1.dev0") > v("6.4.0"));
        assert_eq!(v("6.4.1dev"), v("6.4.1.dev0"));
        assert!(v("1.0.dev1") > v("1.0.dev0"));
    }

    #[test]
    fn test_ordering_matches_release_thresholds() {
        assert!(v("5.4.0") <= v("5.4.0"));
        assert!(v("5.5.1") > v("5.4.0"));
        assert!(v("5.6.4") <= v("5.6.4"));
        assert!(v("5.7.4") > v("5.6.4"));
        assert!(v("1.9") <= v("2"));
    }

    #[test]
    fn test_display() {
        assert_eq!(v("5.6.0").to_string(), "5.6.0");
        assert_eq!(v("6.4.1.dev0").to_string(), "6.4.1.dev0");
        assert_eq!(v("v2").to_string(), "2");
    }

    #[test]
    fn test_invalid() {
        assert!(AppVersion::parse("").is_err());
        assert!(AppVersion::parse("abc").is_err());
        assert!(AppVersion::parse("1..2").is_err());
        assert!(AppVersion::parse("dev0").is_err());
        assert_eq!(
            "x1".parse::<AppVersion>(),
            Err(RawIoError::InvalidVersion("x1".to_string()))
        );
    }
}
