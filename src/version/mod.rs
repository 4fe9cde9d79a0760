//! Version model - PHP release numbers and the configured target range
//!
//! The range is parsed once per run and shared read-only by every analysis.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use pest::Parser;
use pest_derive::Parser;
use serde::Serialize;

use crate::error::{CompatError, Result};

#[derive(Parser)]
#[grammar = "version/range.pest"]
struct RangeParser;

/// PHP releases known to the registry, oldest first.
const KNOWN_RELEASES: &[(u32, u32)] = &[
    (5, 0),
    (5, 1),
    (5, 2),
    (5, 3),
    (5, 4),
    (5, 5),
    (5, 6),
    (7, 0),
    (7, 1),
    (7, 2),
    (7, 3),
    (7, 4),
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
];

/// A `MAJOR.MINOR[.PATCH]` version. A missing patch compares as `0`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<u32>,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: None,
        }
    }

    pub const fn with_patch(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch: Some(patch),
        }
    }

    fn key(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch.unwrap_or(0))
    }

    /// The latest known release strictly below this version.
    ///
    /// `7.4` -> `7.3`, `7.0` -> `5.6`. Versions older than every known
    /// release have no predecessor.
    pub fn previous_release(&self) -> Option<Version> {
        KNOWN_RELEASES
            .iter()
            .rev()
            .map(|&(major, minor)| Version::new(major, minor))
            .find(|candidate| candidate < self)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

impl FromStr for Version {
    type Err = CompatError;

    /// Accepts `MAJOR.MINOR` and `MAJOR.MINOR.PATCH`.
    fn from_str(raw: &str) -> Result<Self> {
        let invalid = || CompatError::InvalidVersionFormat {
            raw: raw.to_string(),
        };
        let parts = raw
            .trim()
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                part.parse::<u32>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<u32>>>()?;
        match parts.as_slice() {
            [major, minor] => Ok(Version::new(*major, *minor)),
            [major, minor, patch] => Ok(Version::with_patch(*major, *minor, *patch)),
            _ => Err(invalid()),
        }
    }
}

/// The inclusive `[low, high]` window of versions the analysed code targets.
///
/// Either bound may be absent (unbounded). With neither bound set the range is
/// unconfigured and every query answers `false`, which disables all checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VersionRange {
    low: Option<Version>,
    high: Option<Version>,
}

impl VersionRange {
    pub fn new(low: Option<Version>, high: Option<Version>) -> Result<Self> {
        if let (Some(low), Some(high)) = (low, high) {
            if low > high {
                return Err(CompatError::InvalidVersionRange {
                    raw: format!("{low}-{high}"),
                    low,
                    high,
                });
            }
        }
        Ok(Self { low, high })
    }

    /// A range covering exactly one version.
    pub fn exact(version: Version) -> Self {
        Self {
            low: Some(version),
            high: Some(version),
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Parse a configured range.
    ///
    /// `"7.0"`, `"7.0-8.1"`, `"7.4-"` and `"-8.0"` are accepted; an empty
    /// string yields the unconfigured range. Versions must have exactly two
    /// parts.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::unconfigured());
        }

        let invalid_format = || CompatError::InvalidVersionFormat {
            raw: raw.to_string(),
        };
        let mut pairs = RangeParser::parse(Rule::range, trimmed).map_err(|_| invalid_format())?;
        let range = pairs.next().ok_or_else(invalid_format)?;

        let mut low = None;
        let mut high = None;
        for pair in range.into_inner() {
            match pair.as_rule() {
                Rule::lower => low = Some(pair.as_str().parse::<Version>().map_err(|_| invalid_format())?),
                Rule::upper => high = Some(pair.as_str().parse::<Version>().map_err(|_| invalid_format())?),
                _ => {}
            }
        }

        // A lone version pins both bounds; "7.4-" leaves the upper one open.
        if low.is_some() && high.is_none() && !trimmed.ends_with('-') {
            high = low;
        }

        if let (Some(l), Some(h)) = (low, high) {
            if l > h {
                return Err(CompatError::InvalidVersionRange {
                    raw: raw.to_string(),
                    low: l,
                    high: h,
                });
            }
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> Option<Version> {
        self.low
    }

    pub fn high(&self) -> Option<Version> {
        self.high
    }

    pub fn is_configured(&self) -> bool {
        self.low.is_some() || self.high.is_some()
    }

    /// Whether the code may be expected to run on `version` or anything below it.
    pub fn should_run_on_or_below(&self, version: Version) -> bool {
        self.is_configured() && self.low.map_or(true, |low| low <= version)
    }

    /// Whether the code may be expected to run on `version` or anything above it.
    pub fn should_run_on_or_above(&self, version: Version) -> bool {
        self.is_configured() && self.high.map_or(true, |high| high >= version)
    }
}

impl FromStr for VersionRange {
    type Err = CompatError;

    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.low, self.high) {
            (Some(low), Some(high)) if low == high => write!(f, "{low}"),
            (Some(low), Some(high)) => write!(f, "{low}-{high}"),
            (Some(low), None) => write!(f, "{low}-"),
            (None, Some(high)) => write!(f, "-{high}"),
            (None, None) => Ok(()),
        }
    }
}
