//! Shared error type for manifest compilation.

/// Result type for manifest compilation
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors produced while compiling a module descriptor
///
/// Every variant is terminal for the compilation call: the compiler never
/// returns a partially built capability/requirement graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    /// Grammar violation in a header value
    #[error("Malformed header: {reason}")]
    MalformedHeader {
        /// What was wrong with the header text
        reason: String,
    },

    /// A feature illegal under the declared metadata dialect
    #[error("Unsupported for dialect: {reason}")]
    UnsupportedDialect {
        /// The feature and the dialect that forbids it
        reason: String,
    },

    /// No native-code clause matches the platform and no optional sentinel
    /// was present
    #[error("Unresolvable native code: {reason}")]
    UnresolvableNativeCode {
        /// Why no clause could be selected
        reason: String,
    },

    /// A selection filter or compiled requirement filter failed to parse
    /// or evaluate
    #[error("Invalid filter: {reason}")]
    InvalidFilter {
        /// The offending expression and failure
        reason: String,
    },
}

impl ManifestError {
    /// Build a [`ManifestError::MalformedHeader`]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            reason: reason.into(),
        }
    }

    /// Build a [`ManifestError::UnsupportedDialect`]
    pub fn dialect(reason: impl Into<String>) -> Self {
        Self::UnsupportedDialect {
            reason: reason.into(),
        }
    }

    /// Build a [`ManifestError::InvalidFilter`]
    pub fn filter(reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManifestError::malformed("duplicate attribute: version");
        assert_eq!(
            format!("{}", err),
            "Malformed header: duplicate attribute: version"
        );

        let err = ManifestError::UnresolvableNativeCode {
            reason: "no matching clause".to_string(),
        };
        assert!(format!("{}", err).contains("no matching clause"));
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            ManifestError::dialect("legacy exports cannot carry directives"),
            ManifestError::dialect("legacy exports cannot carry directives"),
        );
        assert_ne!(
            ManifestError::malformed("x"),
            ManifestError::filter("x"),
        );
    }
}
