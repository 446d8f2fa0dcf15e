//! Native-library clause parsing.

use crate::platform::{normalize_os_name, normalize_os_version, normalize_processor};
use lattice_core::{split_delimited, ManifestError, ManifestResult};
use serde::{Deserialize, Serialize};

/// The optional-clause sentinel: a bare `*` as the last clause
pub const OPTIONAL_SENTINEL: &str = "*";

/// One native-library clause from the `native-code` header
///
/// Unlike generic header clauses, the platform properties here may
/// repeat (`osname=Linux; osname=Win32`); each occurrence appends to the
/// corresponding list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeClause {
    /// Library file paths, in declaration order
    pub library_files: Vec<String>,
    /// Canonical OS names the clause accepts
    pub os_names: Vec<String>,
    /// Canonical processor families the clause accepts
    pub processors: Vec<String>,
    /// OS-version range strings (kept raw; parsed at match time)
    pub os_versions: Vec<String>,
    /// Language codes the clause accepts
    pub languages: Vec<String>,
    /// Optional selection-filter expression source
    pub selection_filter: Option<String>,
}

/// A parsed `native-code` header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeHeader {
    /// Clauses in declaration order, sentinel removed
    pub clauses: Vec<NativeClause>,
    /// Whether the trailing optional sentinel was present
    pub optional: bool,
}

/// Parse the full `native-code` header value
///
/// # Errors
///
/// Returns [`ManifestError::MalformedHeader`] on grammar violations: a
/// clause with properties but no library files, a property token without
/// a name, or a misplaced optional sentinel.
pub fn parse_native_header(header: &str) -> ManifestResult<NativeHeader> {
    let clause_strings = split_delimited(header, ",")?;
    let mut clauses = Vec::new();
    let mut optional = false;

    let count = clause_strings.len();
    for (idx, clause_string) in clause_strings.iter().enumerate() {
        if clause_string == OPTIONAL_SENTINEL {
            if idx + 1 != count {
                return Err(ManifestError::malformed(
                    "optional native-code sentinel must be the last clause",
                ));
            }
            optional = true;
            continue;
        }
        clauses.push(parse_clause(clause_string)?);
    }

    Ok(NativeHeader { clauses, optional })
}

/// Parse one semicolon-delimited native-library clause
fn parse_clause(clause: &str) -> ManifestResult<NativeClause> {
    let mut library_files = Vec::new();
    let mut os_names = Vec::new();
    let mut processors = Vec::new();
    let mut os_versions = Vec::new();
    let mut languages = Vec::new();
    let mut selection_filter = None;

    for token in split_delimited(clause, ";")? {
        let Some(eq) = token.find('=') else {
            // A path token; a leading slash is not significant.
            library_files.push(token.trim_start_matches('/').to_string());
            continue;
        };
        if eq == 0 {
            return Err(ManifestError::malformed(format!(
                "native-code property without a name: {token}"
            )));
        }

        let name = token[..eq].trim().to_lowercase();
        let value = unquote(token[eq + 1..].trim());

        match name.as_str() {
            "osname" => os_names.push(normalize_os_name(&value)),
            "osversion" => os_versions.push(normalize_os_version_range(&value)),
            "processor" => processors.push(normalize_processor(&value)),
            "language" => languages.push(value.to_lowercase()),
            "selection-filter" => selection_filter = Some(value),
            other => {
                tracing::warn!(property = other, "ignoring unknown native-code property");
            }
        }
    }

    if library_files.is_empty() {
        return Err(ManifestError::malformed(format!(
            "native-code clause declares no library files: {clause}"
        )));
    }

    Ok(NativeClause {
        library_files,
        os_names,
        processors,
        os_versions,
        languages,
        selection_filter,
    })
}

/// Normalize an osversion value, preserving interval syntax
fn normalize_os_version_range(value: &str) -> String {
    let value = value.trim();
    let Some(first) = value.chars().next() else {
        return normalize_os_version(value);
    };
    if first != '[' && first != '(' {
        return normalize_os_version(value);
    }
    // Interval form: normalize each bound, keep the brackets.
    let Some(last) = value.chars().last() else {
        return value.to_string();
    };
    let inner = &value[1..value.len().saturating_sub(1)];
    match inner.split_once(',') {
        Some((low, high)) => format!(
            "{first}{},{}{last}",
            normalize_os_version(low),
            normalize_os_version(high)
        ),
        None => value.to_string(),
    }
}

fn unquote(value: &str) -> String {
    let v = value.strip_prefix('"').unwrap_or(value);
    let v = v.strip_suffix('"').unwrap_or(v);
    v.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_clause() {
        let header = parse_native_header("libfoo.so;osname=Linux;processor=x86_64").unwrap();
        assert!(!header.optional);
        assert_eq!(header.clauses.len(), 1);
        let c = &header.clauses[0];
        assert_eq!(c.library_files, vec!["libfoo.so"]);
        assert_eq!(c.os_names, vec!["linux"]);
        assert_eq!(c.processors, vec!["x86-64"]);
    }

    #[test]
    fn test_repeating_properties_append() {
        let header =
            parse_native_header("lib/a.so;b.so;osname=Linux;osname=Win32;language=en;language=fr")
                .unwrap();
        let c = &header.clauses[0];
        assert_eq!(c.library_files, vec!["lib/a.so", "b.so"]);
        assert_eq!(c.os_names, vec!["linux", "win32"]);
        assert_eq!(c.languages, vec!["en", "fr"]);
    }

    #[test]
    fn test_optional_sentinel() {
        let header = parse_native_header("a.so;osname=Linux, *").unwrap();
        assert!(header.optional);
        assert_eq!(header.clauses.len(), 1);
    }

    #[test]
    fn test_sentinel_must_be_last() {
        assert!(parse_native_header("*, a.so;osname=Linux").is_err());
    }

    #[test]
    fn test_selection_filter_value_keeps_delimiters() {
        let header =
            parse_native_header(r#"a.so;osname=Linux;selection-filter="(windowing=gtk)""#).unwrap();
        assert_eq!(
            header.clauses[0].selection_filter.as_deref(),
            Some("(windowing=gtk)")
        );
    }

    #[test]
    fn test_osversion_interval_normalized() {
        let header = parse_native_header(r#"a.so;osname=Linux;osversion="[5.0,6.0)""#).unwrap();
        assert_eq!(header.clauses[0].os_versions, vec!["[5.0.0,6.0.0)"]);
    }

    #[test]
    fn test_clause_without_paths_fails() {
        assert!(parse_native_header("osname=Linux;processor=x86").is_err());
    }

    #[test]
    fn test_leading_slash_stripped() {
        let header = parse_native_header("/native/a.so;osname=Linux").unwrap();
        assert_eq!(header.clauses[0].library_files, vec!["native/a.so"]);
    }
}
