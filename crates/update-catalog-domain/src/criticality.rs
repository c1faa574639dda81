//! Ordinal severity of an upgrade recommendation.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// How urgently a client should act on an upgrade step.
///
/// The ordering is by severity level, with `Exceptional` as a negative
/// sentinel below `None`: it is never derived by the planner, only authored
/// on releases that need manual interception.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Criticality {
    #[default]
    None,
    Possible,
    Recommended,
    StronglyRecommended,
    Critical,
    Enforced,
    /// Manual interception necessary
    Exceptional,
}

/// Error type for unknown criticality representations
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown criticality: {0}")]
pub struct CriticalityError(pub String);

impl Criticality {
    /// The numeric severity level, as persisted by the store.
    pub fn level(self) -> i16 {
        match self {
            Criticality::None => 0,
            Criticality::Possible => 1,
            Criticality::Recommended => 2,
            Criticality::StronglyRecommended => 3,
            Criticality::Critical => 4,
            Criticality::Enforced => 5,
            Criticality::Exceptional => -1,
        }
    }

    /// Inverse of [`level`](Self::level).
    pub fn from_level(level: i16) -> Result<Self, CriticalityError> {
        match level {
            0 => Ok(Criticality::None),
            1 => Ok(Criticality::Possible),
            2 => Ok(Criticality::Recommended),
            3 => Ok(Criticality::StronglyRecommended),
            4 => Ok(Criticality::Critical),
            5 => Ok(Criticality::Enforced),
            -1 => Ok(Criticality::Exceptional),
            other => Err(CriticalityError(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Criticality::None => "None",
            Criticality::Possible => "Possible",
            Criticality::Recommended => "Recommended",
            Criticality::StronglyRecommended => "Strongly Recommended",
            Criticality::Critical => "Critical",
            Criticality::Enforced => "Enforced",
            Criticality::Exceptional => "Exceptional",
        }
    }
}

impl Ord for Criticality {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl PartialOrd for Criticality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Criticality {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Criticality {
    type Err = CriticalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Criticality::None),
            "Possible" => Ok(Criticality::Possible),
            "Recommended" => Ok(Criticality::Recommended),
            "Strongly Recommended" => Ok(Criticality::StronglyRecommended),
            "Critical" => Ok(Criticality::Critical),
            "Enforced" => Ok(Criticality::Enforced),
            "Exceptional" => Ok(Criticality::Exceptional),
            other => Err(CriticalityError(other.to_string())),
        }
    }
}

impl Serialize for Criticality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Criticality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_round_trip() {
        for criticality in [
            Criticality::None,
            Criticality::Possible,
            Criticality::Recommended,
            Criticality::StronglyRecommended,
            Criticality::Critical,
            Criticality::Enforced,
            Criticality::Exceptional,
        ] {
            let parsed: Criticality = criticality.as_str().parse().unwrap();
            assert_eq!(parsed, criticality);
        }

        assert!("Urgent".parse::<Criticality>().is_err());
    }

    #[test]
    fn test_level_round_trip() {
        assert_eq!(Criticality::from_level(3).unwrap(), Criticality::StronglyRecommended);
        assert_eq!(Criticality::from_level(-1).unwrap(), Criticality::Exceptional);
        assert!(Criticality::from_level(7).is_err());
    }

    #[test]
    fn test_ordering_puts_exceptional_below_none() {
        assert!(Criticality::Exceptional < Criticality::None);
        assert!(Criticality::Possible < Criticality::Recommended);
        assert_eq!(
            Criticality::Possible.max(Criticality::Exceptional),
            Criticality::Possible
        );
    }

    #[test]
    fn test_json_uses_human_strings() {
        let json = serde_json::to_string(&Criticality::StronglyRecommended).unwrap();
        assert_eq!(json, "\"Strongly Recommended\"");
        let back: Criticality = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Criticality::StronglyRecommended);
    }
}
