//! Version range with independently inclusive/exclusive bounds.

use crate::error::{ManifestError, ManifestResult};
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interval of acceptable versions
///
/// A bare version string (`"1.2"`) denotes an inclusive floor with no
/// ceiling. Interval syntax (`"[1.0,2.0)"`) sets both bounds; `[`/`]` are
/// inclusive, `(`/`)` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRange {
    /// Lowest acceptable version
    pub floor: Version,
    /// Whether the floor itself is acceptable
    pub floor_inclusive: bool,
    /// Highest acceptable version, unbounded when absent
    pub ceiling: Option<Version>,
    /// Whether the ceiling itself is acceptable
    pub ceiling_inclusive: bool,
}

impl VersionRange {
    /// Range accepting `floor` and everything above it
    #[must_use]
    pub const fn at_least(floor: Version) -> Self {
        Self {
            floor,
            floor_inclusive: true,
            ceiling: None,
            ceiling_inclusive: false,
        }
    }

    /// Parse from string
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::MalformedHeader`] on bad interval syntax or
    /// an unparsable bound.
    pub fn parse(s: &str) -> ManifestResult<Self> {
        let s = s.trim();
        let first = s.chars().next();
        let floor_inclusive = match first {
            Some('[') => true,
            Some('(') => false,
            _ => return Ok(Self::at_least(Version::parse(s)?)),
        };

        let last = s.chars().last();
        let ceiling_inclusive = match last {
            Some(']') => true,
            Some(')') => false,
            _ => {
                return Err(ManifestError::malformed(format!(
                    "unterminated version interval: {s}"
                )));
            }
        };

        let inner = &s[1..s.len() - 1];
        let (low, high) = inner.split_once(',').ok_or_else(|| {
            ManifestError::malformed(format!("version interval needs two bounds: {s}"))
        })?;

        Ok(Self {
            floor: Version::parse(low)?,
            floor_inclusive,
            ceiling: Some(Version::parse(high)?),
            ceiling_inclusive,
        })
    }

    /// Whether `version` falls inside this range
    #[must_use]
    pub fn includes(&self, version: &Version) -> bool {
        let above_floor = if self.floor_inclusive {
            *version >= self.floor
        } else {
            *version > self.floor
        };
        if !above_floor {
            return false;
        }
        match &self.ceiling {
            None => true,
            Some(ceiling) => {
                if self.ceiling_inclusive {
                    *version <= *ceiling
                } else {
                    *version < *ceiling
                }
            }
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ceiling {
            None => write!(f, "{}", self.floor),
            Some(ceiling) => write!(
                f,
                "{}{},{}{}",
                if self.floor_inclusive { '[' } else { '(' },
                self.floor,
                ceiling,
                if self.ceiling_inclusive { ']' } else { ')' },
            ),
        }
    }
}

impl FromStr for VersionRange {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
