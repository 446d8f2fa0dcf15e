//! Filter expression tree and evaluation.

use lattice_core::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A boolean matching expression over a property set
///
/// Ordered comparisons (`Gte`/`Lte`) interpret both sides as versions;
/// a property that does not parse as a version simply fails the test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// Property equals value exactly
    Eq {
        /// Property name
        key: String,
        /// Expected value
        value: String,
    },
    /// Property, read as a version, is `>=` the bound
    Gte {
        /// Property name
        key: String,
        /// Lower bound
        value: Version,
    },
    /// Property, read as a version, is `<=` the bound
    Lte {
        /// Property name
        key: String,
        /// Upper bound
        value: Version,
    },
    /// Property matches a `*` wildcard pattern
    ///
    /// `parts` is the pattern split on `*`: first part anchors the start,
    /// last part anchors the end, interior parts must appear in order.
    Substring {
        /// Property name
        key: String,
        /// Pattern fragments between wildcards
        parts: Vec<String>,
    },
    /// All sub-filters match
    And(Vec<Filter>),
    /// At least one sub-filter matches
    Or(Vec<Filter>),
    /// Sub-filter does not match
    Not(Box<Filter>),
}

impl Filter {
    /// Build a substring filter from a `*` pattern
    #[must_use]
    pub fn substring(key: impl Into<String>, pattern: &str) -> Self {
        Self::Substring {
            key: key.into(),
            parts: pattern.split('*').map(str::to_string).collect(),
        }
    }

    /// Evaluate against a property map
    #[must_use]
    pub fn matches(&self, props: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Eq { key, value } => props.get(key).is_some_and(|v| v == value),
            Self::Gte { key, value } => props
                .get(key)
                .and_then(|v| Version::parse(v).ok())
                .is_some_and(|v| v >= *value),
            Self::Lte { key, value } => props
                .get(key)
                .and_then(|v| Version::parse(v).ok())
                .is_some_and(|v| v <= *value),
            Self::Substring { key, parts } => {
                props.get(key).is_some_and(|v| substring_match(parts, v))
            }
            Self::And(subs) => subs.iter().all(|f| f.matches(props)),
            Self::Or(subs) => subs.iter().any(|f| f.matches(props)),
            Self::Not(sub) => !sub.matches(props),
        }
    }
}

/// Walk the pattern fragments through `value` left to right
fn substring_match(parts: &[String], value: &str) -> bool {
    let Some((first, rest)) = parts.split_first() else {
        return value.is_empty();
    };
    let Some(mut remainder) = value.strip_prefix(first.as_str()) else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        // No wildcard at all: the pattern was a bare literal.
        return remainder.is_empty();
    };
    for part in middle {
        match remainder.find(part.as_str()) {
            Some(pos) => remainder = &remainder[pos + part.len()..],
            None => return false,
        }
    }
    remainder.ends_with(last.as_str())
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq { key, value } => write!(f, "({key}={value})"),
            Self::Gte { key, value } => write!(f, "({key}>={value})"),
            Self::Lte { key, value } => write!(f, "({key}<={value})"),
            Self::Substring { key, parts } => {
                write!(f, "({key}={})", parts.join("*"))
            }
            Self::And(subs) => {
                write!(f, "(&")?;
                for sub in subs {
                    write!(f, "{sub}")?;
                }
                write!(f, ")")
            }
            Self::Or(subs) => {
                write!(f, "(|")?;
                for sub in subs {
                    write!(f, "{sub}")?;
                }
                write!(f, ")")
            }
            Self::Not(sub) => write!(f, "(!{sub})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_eq() {
        let f = Filter::Eq {
            key: "package".into(),
            value: "org.example".into(),
        };
        assert!(f.matches(&props(&[("package", "org.example")])));
        assert!(!f.matches(&props(&[("package", "org.other")])));
        assert!(!f.matches(&props(&[])));
    }

    #[test]
    fn test_version_bounds() {
        let gte = Filter::Gte {
            key: "version".into(),
            value: Version::new(1, 0, 0),
        };
        assert!(gte.matches(&props(&[("version", "1.5.0")])));
        assert!(gte.matches(&props(&[("version", "1.0.0")])));
        assert!(!gte.matches(&props(&[("version", "0.9.0")])));
        // Non-version property fails an ordered test.
        assert!(!gte.matches(&props(&[("version", "not-a-version")])));
    }

    #[test]
    fn test_substring() {
        let f = Filter::substring("package", "org.example.*");
        assert!(f.matches(&props(&[("package", "org.example.util")])));
        assert!(!f.matches(&props(&[("package", "com.example.util")])));

        let f = Filter::substring("os", "*nux");
        assert!(f.matches(&props(&[("os", "linux")])));

        let f = Filter::substring("name", "a*b*c");
        assert!(f.matches(&props(&[("name", "aXbYc")])));
        assert!(f.matches(&props(&[("name", "abc")])));
        assert!(!f.matches(&props(&[("name", "acb")])));
    }

    #[test]
    fn test_substring_overlap_does_not_double_count() {
        // "a" anchors the start; "a" must also end the string after it.
        let f = Filter::substring("name", "a*a");
        assert!(!f.matches(&props(&[("name", "a")])));
        assert!(f.matches(&props(&[("name", "aa")])));
    }

    #[test]
    fn test_combinators() {
        let f = Filter::And(vec![
            Filter::Eq {
                key: "os".into(),
                value: "linux".into(),
            },
            Filter::Not(Box::new(Filter::Eq {
                key: "processor".into(),
                value: "arm".into(),
            })),
        ]);
        assert!(f.matches(&props(&[("os", "linux"), ("processor", "x86-64")])));
        assert!(!f.matches(&props(&[("os", "linux"), ("processor", "arm")])));
    }

    proptest! {
        // A value built by interleaving the pattern fragments with
        // arbitrary filler must match the pattern they came from.
        #[test]
        fn prop_interleaved_value_matches_pattern(
            parts in proptest::collection::vec("[a-z]{0,3}", 1..5),
            fillers in proptest::collection::vec("[a-z]{0,3}", 0..5),
        ) {
            let pattern = parts.join("*");
            let mut value = String::new();
            for (i, part) in parts.iter().enumerate() {
                value.push_str(part);
                if i + 1 < parts.len() {
                    value.push_str(fillers.get(i).map_or("", String::as_str));
                }
            }
            let filter = Filter::substring("k", &pattern);
            prop_assert!(filter.matches(&props(&[("k", value.as_str())])));
        }
    }

    #[test]
    fn test_display() {
        let f = Filter::And(vec![
            Filter::Eq {
                key: "package".into(),
                value: "a.b".into(),
            },
            Filter::Gte {
                key: "version".into(),
                value: Version::new(1, 0, 0),
            },
        ]);
        assert_eq!(format!("{}", f), "(&(package=a.b)(version>=1.0.0))");
    }
}
