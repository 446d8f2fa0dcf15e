//! Version type for module metadata.

use crate::error::{ManifestError, ManifestResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Structured module version: `major.minor.micro[-qualifier]`
///
/// Ordering compares the numeric triple first, then the qualifier
/// lexically; an absent qualifier sorts before any present one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Version {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
    /// Micro component
    pub micro: u32,
    /// Optional qualifier (the part after `-`)
    pub qualifier: Option<String>,
}

impl Version {
    /// Create a new version without a qualifier
    #[must_use]
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: None,
        }
    }

    /// Parse from string
    ///
    /// Trailing components may be omitted (`"1"`, `"1.2"`); the qualifier,
    /// if any, follows the micro component after a `-`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::MalformedHeader`] if the text is not a
    /// version.
    pub fn parse(s: &str) -> ManifestResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ManifestError::malformed("empty version string"));
        }

        let (numeric, qualifier) = match s.split_once('-') {
            Some((n, q)) if !q.is_empty() => (n, Some(q.to_string())),
            Some(_) => {
                return Err(ManifestError::malformed(format!(
                    "empty version qualifier: {s}"
                )));
            }
            None => (s, None),
        };

        let mut parts = [0u32; 3];
        let mut count = 0;
        for piece in numeric.split('.') {
            if count == 3 {
                return Err(ManifestError::malformed(format!(
                    "too many version components: {s}"
                )));
            }
            parts[count] = piece.parse().map_err(|_| {
                ManifestError::malformed(format!("invalid version component '{piece}' in: {s}"))
            })?;
            count += 1;
        }

        Ok(Self {
            major: parts[0],
            minor: parts[1],
            micro: parts[2],
            qualifier,
        })
    }

    /// Version with a qualifier
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if let Some(q) = &self.qualifier {
            write!(f, "-{q}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_full() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_partial() {
        assert_eq!(Version::parse("1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(Version::parse("1.5").unwrap(), Version::new(1, 5, 0));
    }

    #[test]
    fn test_version_parse_qualifier() {
        let v = Version::parse("2.0.1-beta").unwrap();
        assert_eq!(v.qualifier.as_deref(), Some("beta"));
        assert_eq!(format!("{}", v), "2.0.1-beta");
    }

    #[test]
    fn test_version_parse_error() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("a.b.c").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("1.2.3-").is_err());
    }

    #[test]
    fn test_version_ord() {
        let v1 = Version::new(1, 2, 3);
        let v2 = Version::new(1, 2, 4);
        let v3 = Version::new(2, 0, 0);
        assert!(v1 < v2);
        assert!(v2 < v3);

        // Plain release sorts before qualified build of the same triple.
        let plain = Version::new(1, 0, 0);
        let tagged = Version::new(1, 0, 0).with_qualifier("rc1");
        assert!(plain < tagged);
    }

    #[test]
    fn test_version_default() {
        assert_eq!(Version::default(), Version::new(0, 0, 0));
        assert_eq!(format!("{}", Version::default()), "0.0.0");
    }

    #[test]
    fn test_version_display_roundtrip() {
        for s in ["0.0.0", "1.2.3", "10.0.99-alpha"] {
            let v = Version::parse(s).unwrap();
            assert_eq!(format!("{}", v), s);
        }
    }
}
