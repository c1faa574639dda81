//! The upgrade-target grammar and its evaluator.
//!
//! An upgrade target describes the next logical version from a given,
//! mostly current, semantic version:
//!
//! - steps are separated by `;` and tried left to right
//! - `#` refers to the current number at that position
//! - `*` refers to the highest available number
//! - `_` refers to the lowest available number
//! - `+` refers to the next available number; `+N` skips N-1 intermediate
//!   numbers, `+e`/`+o` restrict to even/odd numbers and `+c` to numbers
//!   with the same parity as the current one (combinable, e.g. `+2e`)
//! - a plain number (optionally `v`-prefixed) refers to that exact value
//!
//! Examples: `*.*.*` is the absolute latest, `#.#.*` the latest patch of
//! the current minor, `+._.*` the latest patch of the first minor of the
//! next major, `4.0.0` exactly that version.
//!
//! When no step yields anything, the evaluator falls back to `#.#.*` once;
//! a `nopatches:` prefix on the target suppresses that fallback.

use crate::errors::CatalogError;
use crate::version::{sort_versions, Version};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Upgrade to the latest minor+patch of the current major, then to the
/// lowest minor of the next major.
pub const DEFAULT_UPGRADE_TARGET: &str = "#.+.*;+._.*";

/// Useful for uncritical, possibly stateless software.
pub const ALWAYS_LATEST: &str = "*.*.*";

/// Useful for end-of-life versions.
pub const ONLY_MINOR_AND_PATCHES: &str = "#.*.*";

/// Useful for ensuring highest compatibility.
pub const ONLY_PATCHES: &str = "#.#.*";

const NOPATCHES_PREFIX: &str = "nopatches:";

static STEP_RE: Lazy<Regex> = Lazy::new(|| {
    const NUM: &str = r"(v?\d+|_|#|\*|\+\d*[eoc]?)";
    let pattern = format!(r"^v?{NUM}\.{NUM}\.{NUM}(-[^+]+)?(\+.*)?$");
    Regex::new(&pattern).expect("step pattern must compile")
});

/// Error type for malformed upgrade targets
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TargetError {
    /// A step did not match the grammar
    #[error("is not a valid upgrade target: {0}")]
    InvalidStep(String),

    /// A position spec could not be interpreted
    #[error("unknown spec format: {0}")]
    UnknownSpec(String),

    /// A `+N` spec with N = 0
    #[error("next spec step count must be at least 1: {0}")]
    ZeroSteps(String),
}

/// A declarative upgrade rule, stored as its source string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeTarget(String);

impl UpgradeTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split off the `nopatches:` modifier. Returns whether the implicit
    /// patch fallback stays enabled, plus the remaining target.
    pub fn without_modifier(&self) -> (bool, UpgradeTarget) {
        match self.0.strip_prefix(NOPATCHES_PREFIX) {
            Some(rest) => (false, UpgradeTarget::new(rest)),
            None => (true, self.clone()),
        }
    }

    /// Check the whole target against the grammar.
    ///
    /// An empty target (or a bare `nopatches:`) is valid; it evaluates as
    /// the default target.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Grammar validation, used before a target is ever stored.
    pub fn validate(&self) -> Result<(), TargetError> {
        let (_, target) = self.without_modifier();
        if target.is_empty() {
            return Ok(());
        }

        for step in target.0.split(';') {
            if !STEP_RE.is_match(step) {
                return Err(TargetError::InvalidStep(step.to_string()));
            }
            // The regex admits the shape; spec parsing catches `+0`.
            parse_step(step)?;
        }

        Ok(())
    }

    /// Decompose into parsed steps, substituting the default for an empty
    /// target.
    pub fn steps(&self) -> Result<Vec<StepSpec>, TargetError> {
        let (_, target) = self.without_modifier();
        let effective = if target.is_empty() {
            DEFAULT_UPGRADE_TARGET
        } else {
            target.as_str()
        };

        effective.split(';').map(parse_step).collect()
    }

    /// The first step's raw position specs and tags, without evaluating.
    pub fn first_spec(&self) -> Result<TargetSpec, TargetError> {
        let (_, target) = self.without_modifier();
        let effective = if target.is_empty() {
            DEFAULT_UPGRADE_TARGET
        } else {
            target.as_str()
        };

        let step = effective.split(';').next().unwrap_or_default();
        let captures = STEP_RE
            .captures(step)
            .ok_or_else(|| TargetError::InvalidStep(step.to_string()))?;

        Ok(TargetSpec {
            major: captures[1].to_string(),
            minor: captures[2].to_string(),
            patch: captures[3].to_string(),
            prerelease: captures.get(4).map(|m| m.as_str()[1..].to_string()),
            build: captures.get(5).map(|m| m.as_str()[1..].to_string()),
        })
    }
}

impl Display for UpgradeTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UpgradeTarget {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The raw pieces of a target's first step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub major: String,
    pub minor: String,
    pub patch: String,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

/// One parsed step of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSpec {
    pub major: NumSpec,
    pub minor: NumSpec,
    pub patch: NumSpec,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

/// A single position spec within a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumSpec {
    /// `#`: keep the current value
    Current,
    /// `*`: the highest available value
    Highest,
    /// `_`: the lowest available value
    Lowest,
    /// An exact value
    Exact(u64),
    /// `+`, `+N`, `+e` and friends
    Next(NextSpec),
}

/// Parameters of a `+` spec. A bare `+` means one step, any parity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextSpec {
    pub steps: u64,
    pub parity: Parity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Any,
    Even,
    Odd,
    /// `c`: whatever parity the current value has
    MatchCurrent,
}

impl Parity {
    fn matches(self, current_value: u64, candidate: u64) -> bool {
        match self {
            Parity::Any => true,
            Parity::Even => candidate % 2 == 0,
            Parity::Odd => candidate % 2 == 1,
            Parity::MatchCurrent => candidate % 2 == current_value % 2,
        }
    }
}

fn parse_step(step: &str) -> Result<StepSpec, TargetError> {
    let captures = STEP_RE
        .captures(step)
        .ok_or_else(|| TargetError::InvalidStep(step.to_string()))?;

    Ok(StepSpec {
        major: parse_num_spec(&captures[1])?,
        minor: parse_num_spec(&captures[2])?,
        patch: parse_num_spec(&captures[3])?,
        prerelease: captures.get(4).map(|m| m.as_str()[1..].to_string()),
        build: captures.get(5).map(|m| m.as_str()[1..].to_string()),
    })
}

fn parse_num_spec(spec: &str) -> Result<NumSpec, TargetError> {
    match spec {
        "#" => return Ok(NumSpec::Current),
        "*" => return Ok(NumSpec::Highest),
        "_" => return Ok(NumSpec::Lowest),
        _ => {}
    }

    if let Some(rest) = spec.strip_prefix('+') {
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        let suffix = &rest[digits.len()..];

        let steps = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u64>()
                .map_err(|_| TargetError::UnknownSpec(spec.to_string()))?
        };
        if steps == 0 {
            return Err(TargetError::ZeroSteps(spec.to_string()));
        }

        let parity = match suffix {
            "" => Parity::Any,
            "e" => Parity::Even,
            "o" => Parity::Odd,
            "c" => Parity::MatchCurrent,
            _ => return Err(TargetError::UnknownSpec(spec.to_string())),
        };

        return Ok(NumSpec::Next(NextSpec { steps, parity }));
    }

    let number = spec.strip_prefix('v').unwrap_or(spec);
    number
        .parse::<u64>()
        .map(NumSpec::Exact)
        .map_err(|_| TargetError::UnknownSpec(spec.to_string()))
}

/// Evaluate a target against a release history.
///
/// Returns the first version any step resolves to that is strictly greater
/// than the current version, or `None` when the history holds nothing new.
/// The patch fallback is the caller's concern; this evaluates the given
/// target only.
pub fn find_target_version(
    available: &[Version],
    current: &Version,
    target: &UpgradeTarget,
) -> Result<Option<Version>, CatalogError> {
    target.validate()?;

    let mut sorted = available.to_vec();
    sort_versions(&mut sorted);

    for step in target.steps()? {
        let narrowed = narrow_position(&sorted, &step.major, current.major, |v| v.major);
        if narrowed.is_empty() {
            continue;
        }

        let narrowed = narrow_position(&narrowed, &step.minor, current.minor, |v| v.minor);
        if narrowed.is_empty() {
            continue;
        }

        let narrowed = narrow_position(&narrowed, &step.patch, current.patch, |v| v.patch);

        // Is there anything new here?
        if let Some(candidate) = narrowed.last() {
            if candidate > current {
                return Ok(Some(candidate.clone()));
            }
        }
    }

    Ok(None)
}

/// Narrow a sorted candidate slice to the versions whose value at one
/// position resolves from the spec. Preserves the ascending order.
fn narrow_position(
    sorted: &[Version],
    spec: &NumSpec,
    current_value: u64,
    key: fn(&Version) -> u64,
) -> Vec<Version> {
    if sorted.is_empty() {
        return Vec::new();
    }

    let distinct = distinct_values(sorted, key);

    let Some(wanted) = resolve_spec(&distinct, spec, current_value) else {
        return Vec::new();
    };

    sorted
        .iter()
        .filter(|version| key(version) == wanted)
        .cloned()
        .collect()
}

fn distinct_values(sorted: &[Version], key: fn(&Version) -> u64) -> Vec<u64> {
    let mut out = Vec::with_capacity(sorted.len());
    for version in sorted {
        let value = key(version);
        if out.last() != Some(&value) {
            out.push(value);
        }
    }
    out
}

/// Resolve a position spec against the strictly-increasing sequence of
/// distinct values available at that position.
fn resolve_spec(distinct: &[u64], spec: &NumSpec, current_value: u64) -> Option<u64> {
    match spec {
        NumSpec::Current => Some(current_value),
        NumSpec::Highest => distinct.last().copied(),
        NumSpec::Lowest => distinct.first().copied(),
        NumSpec::Exact(value) => Some(*value),
        NumSpec::Next(next) => next_in_sequence(distinct, current_value, next),
    }
}

/// Walk forward from the current value, counting down the requested steps
/// over values of the requested parity.
fn next_in_sequence(distinct: &[u64], current_value: u64, next: &NextSpec) -> Option<u64> {
    let position = distinct.iter().position(|&v| v == current_value);

    // Already at the end?
    if position == Some(distinct.len() - 1) {
        return None;
    }

    // An absent current value starts the walk at the front.
    let start = position.map_or(0, |p| p + 1);

    let mut remaining = next.steps;
    for &candidate in &distinct[start..] {
        if next.parity.matches(current_value, candidate) {
            remaining -= 1;
            if remaining == 0 {
                return Some(candidate);
            }
        }
    }

    None
}
