//! Semantic version algebra for release planning.
//!
//! Versions follow SemVer 2.0.0 with an optional leading `v`. Parsing
//! completes missing minor/patch positions with zero, so `v1` and `1.2` are
//! accepted and canonicalize to `v1.0.0` and `v1.2.0`. The canonical string
//! form always carries the leading `v`.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// Error type for version parsing failures
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum VersionError {
    /// Not a valid semantic version
    #[error("is not a valid semantic version: {0}")]
    InvalidFormat(String),

    /// A numeric position failed to parse
    #[error("invalid {position} in version: {input}")]
    InvalidPosition {
        position: &'static str,
        input: String,
    },
}

/// A parsed semantic version.
///
/// Ordering follows SemVer precedence: the numeric triple first, then
/// prerelease identifiers (a prerelease sorts below its release), while
/// build metadata never participates in ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Parse a version string, accepting an optional leading `v` and
    /// incomplete triples.
    ///
    /// # Example
    /// ```
    /// # use update_catalog_domain::version::Version;
    /// let v = Version::parse("1.2").unwrap();
    /// assert_eq!(v.to_string(), "v1.2.0");
    /// ```
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.strip_prefix('v').unwrap_or(input);
        if raw.is_empty() {
            return Err(VersionError::InvalidFormat(input.to_string()));
        }

        let (core_and_pre, build) = match raw.split_once('+') {
            Some((core, build)) => (core, Some(build.to_string())),
            None => (raw, None),
        };

        let (core, prerelease) = match core_and_pre.split_once('-') {
            Some((core, pre)) => (core, Some(pre.to_string())),
            None => (core_and_pre, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(VersionError::InvalidFormat(input.to_string()));
        }

        let position = |index: usize, name: &'static str| -> Result<u64, VersionError> {
            match parts.get(index) {
                None => Ok(0),
                Some(part) => part.parse::<u64>().map_err(|_| VersionError::InvalidPosition {
                    position: name,
                    input: input.to_string(),
                }),
            }
        };

        Ok(Self {
            major: position(0, "major")?,
            minor: position(1, "minor")?,
            patch: position(2, "patch")?,
            prerelease,
            build,
        })
    }

    /// The canonical string form with leading `v` and a full triple.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// True when the numeric triples are equal, ignoring tags.
    pub fn same_triple(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor && self.patch == other.patch
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| compare_prerelease(self.prerelease.as_deref(), other.prerelease.as_deref()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// SemVer prerelease precedence: absence wins, identifiers compare
/// dot-wise with numeric identifiers below alphanumeric ones.
fn compare_prerelease(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let mut left = a.split('.');
            let mut right = b.split('.');
            loop {
                match (left.next(), right.next()) {
                    (None, None) => return Ordering::Equal,
                    (None, Some(_)) => return Ordering::Less,
                    (Some(_), None) => return Ordering::Greater,
                    (Some(l), Some(r)) => {
                        let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                            (Ok(l), Ok(r)) => l.cmp(&r),
                            (Ok(_), Err(_)) => Ordering::Less,
                            (Err(_), Ok(_)) => Ordering::Greater,
                            (Err(_), Err(_)) => l.cmp(r),
                        };
                        if ordering != Ordering::Equal {
                            return ordering;
                        }
                    }
                }
            }
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(de::Error::custom)
    }
}

/// Sort a list of versions ascending by SemVer precedence.
pub fn sort_versions(versions: &mut [Version]) {
    versions.sort();
}

/// Distinct majors of a pre-sorted ascending slice, in order.
pub fn distinct_majors(sorted: &[Version]) -> Vec<u64> {
    distinct_positions(sorted, |v| v.major)
}

/// Distinct minors of a pre-sorted ascending slice, in order.
///
/// Only consecutive duplicates collapse; callers narrow to a single major
/// before asking for minors.
pub fn distinct_minors(sorted: &[Version]) -> Vec<u64> {
    distinct_positions(sorted, |v| v.minor)
}

/// Distinct patches of a pre-sorted ascending slice, in order.
pub fn distinct_patches(sorted: &[Version]) -> Vec<u64> {
    distinct_positions(sorted, |v| v.patch)
}

fn distinct_positions(sorted: &[Version], key: impl Fn(&Version) -> u64) -> Vec<u64> {
    let mut out = Vec::with_capacity(sorted.len());
    for version in sorted {
        let value = key(version);
        if out.last() != Some(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_triple() {
        let v = Version::parse("v1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));

        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_completes_missing_positions() {
        assert_eq!(Version::parse("v1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(Version::parse("1.2").unwrap(), Version::new(1, 2, 0));
    }

    #[test]
    fn test_parse_tags() {
        let v = Version::parse("v1.2.3-rc.1+build.7").unwrap();
        assert_eq!(v.prerelease.as_deref(), Some("rc.1"));
        assert_eq!(v.build.as_deref(), Some("build.7"));

        let v = Version::parse("v1.2.3+build.7").unwrap();
        assert_eq!(v.prerelease, None);
        assert_eq!(v.build.as_deref(), Some("build.7"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("v").is_err());
        assert!(Version::parse("a.b.c").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("1..3").is_err());
    }

    #[test]
    fn test_canonical_display() {
        assert_eq!(Version::parse("1.2").unwrap().to_string(), "v1.2.0");
        assert_eq!(
            Version::parse("v2.0.1-beta").unwrap().to_string(),
            "v2.0.1-beta"
        );
    }

    #[test]
    fn test_ordering() {
        let v100 = Version::new(1, 0, 0);
        let v110 = Version::new(1, 1, 0);
        let v200 = Version::new(2, 0, 0);

        assert!(v100 < v110);
        assert!(v110 < v200);

        let pre = Version::parse("v1.0.0-alpha").unwrap();
        assert!(pre < v100);

        let alpha = Version::parse("v1.0.0-alpha.2").unwrap();
        let beta = Version::parse("v1.0.0-alpha.11").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn test_build_metadata_ignored_in_ordering() {
        let a = Version::parse("v1.0.0+one").unwrap();
        let b = Version::parse("v1.0.0+two").unwrap();
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_distinct_positions() {
        let mut versions: Vec<Version> = ["v1.0.0", "v1.0.1", "v1.2.0", "v2.0.0", "v2.1.0"]
            .iter()
            .map(|s| Version::parse(s).unwrap())
            .collect();
        sort_versions(&mut versions);

        assert_eq!(distinct_majors(&versions), vec![1, 2]);

        let ones: Vec<Version> = versions.iter().filter(|v| v.major == 1).cloned().collect();
        assert_eq!(distinct_minors(&ones), vec![0, 2]);
        assert_eq!(distinct_patches(&ones[..2]), vec![0, 1]);
    }

    #[test]
    fn test_serde_round_trip() {
        let v = Version::parse("v1.2.3-rc.1").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"v1.2.3-rc.1\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
