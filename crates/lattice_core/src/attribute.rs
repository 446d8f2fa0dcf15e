//! Clause directive and attribute value types.

use crate::range::VersionRange;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A clause modifier controlling resolution or parse behavior
///
/// Directives are never matched through filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Directive name
    pub name: String,
    /// Directive value (unquoted)
    pub value: String,
}

impl Directive {
    /// Create a new directive
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A clause attribute value
///
/// Attributes start life as text; header normalization coerces version
/// attributes to their typed forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Uninterpreted text
    Text(String),
    /// A single structured version
    Version(Version),
    /// A version range
    Range(VersionRange),
}

impl AttributeValue {
    /// The textual rendering of the value, as used for equality filters
    #[must_use]
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Version(v) => write!(f, "{v}"),
            Self::Range(r) => write!(f, "{r}"),
        }
    }
}

/// A clause key/value contributing to filter matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub value: AttributeValue,
    /// Whether a prospective matcher must understand this attribute
    pub mandatory: bool,
}

impl Attribute {
    /// Create a new non-mandatory text attribute
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::Text(value.into()),
            mandatory: false,
        }
    }

    /// Create a new non-mandatory attribute from a typed value
    #[must_use]
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
            mandatory: false,
        }
    }

    /// Mark the attribute mandatory
    #[must_use]
    pub fn into_mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }
}
