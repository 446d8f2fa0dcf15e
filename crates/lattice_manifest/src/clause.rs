//! Clause structuring over tokenized header text.
//!
//! A header value is a comma-separated list of clauses; a clause is one
//! or more semicolon-separated paths followed by directives (`name:=v`)
//! and attributes (`name=v`). Token classification is positional: once a
//! directive or attribute has appeared, a bare path token is an error.

use indexmap::IndexMap;
use lattice_core::{split_delimited, AttributeValue, ManifestError, ManifestResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One structured header clause
///
/// Attributes start out as [`AttributeValue::Text`]; header
/// normalization coerces version-bearing attributes to their typed
/// forms in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Path tokens, in declaration order (at least one)
    pub paths: Vec<String>,
    /// Directives by name, declaration order preserved
    pub directives: IndexMap<String, String>,
    /// Attributes by name, declaration order preserved
    pub attributes: IndexMap<String, AttributeValue>,
}

impl Clause {
    /// Clause with the given paths and nothing else
    #[must_use]
    pub fn from_paths(paths: Vec<String>) -> Self {
        Self {
            paths,
            directives: IndexMap::new(),
            attributes: IndexMap::new(),
        }
    }
}

/// Parse a header value into structured clauses
///
/// An empty value yields no clauses.
///
/// # Errors
///
/// Returns [`ManifestError::MalformedHeader`] on an unterminated quote, a
/// clause without paths, a path token after a directive or attribute, or
/// a duplicate directive/attribute name within one clause.
pub fn parse_header(value: &str) -> ManifestResult<Vec<Clause>> {
    let mut clauses = Vec::new();
    for clause_text in split_delimited(value, ",")? {
        clauses.push(parse_clause(&clause_text)?);
    }
    Ok(clauses)
}

fn parse_clause(clause_text: &str) -> ManifestResult<Clause> {
    let mut paths = Vec::new();
    let mut directives = IndexMap::new();
    let mut attributes = IndexMap::new();

    for token in split_delimited(clause_text, ";")? {
        let Some(eq) = token.find('=') else {
            if !directives.is_empty() || !attributes.is_empty() {
                return Err(ManifestError::malformed(format!(
                    "path token after directives/attributes: {token}"
                )));
            }
            paths.push(token);
            continue;
        };

        // `name:=value` is a directive, `name=value` an attribute.
        let is_directive = eq > 0 && token.as_bytes()[eq - 1] == b':';
        let name_end = if is_directive { eq - 1 } else { eq };
        let name = token[..name_end].trim().to_string();
        if name.is_empty() {
            return Err(ManifestError::malformed(format!(
                "directive or attribute without a name: {token}"
            )));
        }
        let value = unquote(token[eq + 1..].trim());

        if is_directive {
            if directives.insert(name.clone(), value).is_some() {
                return Err(ManifestError::malformed(format!(
                    "duplicate directive: {name}"
                )));
            }
        } else if attributes
            .insert(name.clone(), AttributeValue::Text(value))
            .is_some()
        {
            return Err(ManifestError::malformed(format!(
                "duplicate attribute: {name}"
            )));
        }
    }

    if paths.is_empty() {
        return Err(ManifestError::malformed(format!(
            "clause declares no paths: {clause_text}"
        )));
    }

    Ok(Clause {
        paths,
        directives,
        attributes,
    })
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

fn quote_if_needed(value: &str) -> String {
    if value.contains([',', ';', '=', ':', ' ']) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.paths.join(";"))?;
        for (name, value) in &self.directives {
            write!(f, ";{name}:={}", quote_if_needed(value))?;
        }
        for (name, value) in &self.attributes {
            write!(f, ";{name}={}", quote_if_needed(&value.as_text()))?;
        }
        Ok(())
    }
}
