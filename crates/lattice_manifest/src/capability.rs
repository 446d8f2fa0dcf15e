//! Capability and requirement materialization.
//!
//! Builders take one normalized clause and emit one capability or
//! requirement per path, prefixing the attribute list with the
//! namespace-identifying attribute. The emitted values are immutable;
//! nothing mutates them after construction.

use crate::clause::Clause;
use indexmap::IndexMap;
use lattice_core::{Attribute, ManifestError, ManifestResult, ModuleId};
use lattice_filter::{compile_attributes, Filter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The `mandatory` directive name on capability clauses
pub const DIRECTIVE_MANDATORY: &str = "mandatory";
/// The `include` member-pattern directive name
pub const DIRECTIVE_INCLUDE: &str = "include";
/// The `exclude` member-pattern directive name
pub const DIRECTIVE_EXCLUDE: &str = "exclude";
/// The `resolution` directive name on requirement clauses
pub const DIRECTIVE_RESOLUTION: &str = "resolution";
/// The `resolution` directive value marking a requirement optional
pub const RESOLUTION_OPTIONAL: &str = "optional";

/// Category tag of a capability or requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// An exported or imported package
    Package,
    /// A module identity, required via `require`
    Module,
    /// A fragment attachment point
    Host,
}

impl Namespace {
    /// The attribute key identifying members of this namespace
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Module => "module",
            Self::Host => "host",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A named, typed contract a module offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Namespace of the offered contract
    pub namespace: Namespace,
    /// Identifier of the owning module (no back-reference)
    pub module: ModuleId,
    /// Attribute list; the first entry identifies the member within the
    /// namespace
    pub attributes: Vec<Attribute>,
    /// Package names this capability's members depend on
    pub uses: Vec<String>,
    /// Member-name patterns admitted by this capability
    pub include: Option<Vec<String>>,
    /// Member-name patterns excluded from this capability
    pub exclude: Option<Vec<String>>,
}

impl Capability {
    /// Look up an attribute by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A named, typed need a module declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Namespace the requirement selects from
    pub namespace: Namespace,
    /// Identifier of the owning module (no back-reference)
    pub module: ModuleId,
    /// Compiled matching filter over a prospective capability's attributes
    pub filter: Filter,
    /// Whether resolution may proceed without satisfying this requirement
    pub optional: bool,
    /// Raw clause directives, retained for diagnostics
    pub directives: IndexMap<String, String>,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Build one capability per path of a normalized clause
///
/// # Errors
///
/// Returns [`ManifestError::MalformedHeader`] when the `mandatory`
/// directive names an attribute the clause does not declare.
pub fn build_capabilities(
    namespace: Namespace,
    module: &ModuleId,
    clause: &Clause,
) -> ManifestResult<Vec<Capability>> {
    let mandatory = clause
        .directives
        .get(DIRECTIVE_MANDATORY)
        .map(|v| split_list(v))
        .unwrap_or_default();
    for name in &mandatory {
        if !clause.attributes.contains_key(name) {
            return Err(ManifestError::malformed(format!(
                "mandatory directive names an undeclared attribute: {name}"
            )));
        }
    }

    let uses = clause
        .directives
        .get(crate::normalize::DIRECTIVE_USES)
        .map(|v| split_list(v))
        .unwrap_or_default();
    let include = clause.directives.get(DIRECTIVE_INCLUDE).map(|v| split_list(v));
    let exclude = clause.directives.get(DIRECTIVE_EXCLUDE).map(|v| split_list(v));

    Ok(clause
        .paths
        .iter()
        .map(|path| {
            let mut attributes = Vec::with_capacity(clause.attributes.len() + 1);
            attributes.push(Attribute::text(namespace.key(), path.clone()));
            for (name, value) in &clause.attributes {
                let attr = Attribute::new(name.clone(), value.clone());
                attributes.push(if mandatory.contains(name) {
                    attr.into_mandatory()
                } else {
                    attr
                });
            }
            Capability {
                namespace,
                module: module.clone(),
                attributes,
                uses: uses.clone(),
                include: include.clone(),
                exclude: exclude.clone(),
            }
        })
        .collect())
}

/// Build one requirement per path of a normalized clause
///
/// The clause's attributes, prefixed with the namespace-identifying
/// attribute, compile into the requirement's matching filter.
#[must_use]
pub fn build_requirements(
    namespace: Namespace,
    module: &ModuleId,
    clause: &Clause,
) -> Vec<Requirement> {
    let optional = clause
        .directives
        .get(DIRECTIVE_RESOLUTION)
        .is_some_and(|v| v == RESOLUTION_OPTIONAL);

    clause
        .paths
        .iter()
        .map(|path| {
            let mut attributes = Vec::with_capacity(clause.attributes.len() + 1);
            attributes.push(Attribute::text(namespace.key(), path.clone()));
            for (name, value) in &clause.attributes {
                attributes.push(Attribute::new(name.clone(), value.clone()));
            }
            Requirement {
                namespace,
                module: module.clone(),
                filter: compile_attributes(&attributes),
                optional,
                directives: clause.directives.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::parse_header;
    use crate::normalize::{normalize_imports, Dialect};
    use std::collections::BTreeMap;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_namespace_attribute_prepended() {
        let clause = &parse_header("org.example;vendor=acme").unwrap()[0];
        let caps =
            build_capabilities(Namespace::Package, &ModuleId::from("m1"), clause).unwrap();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].attributes[0], Attribute::text("package", "org.example"));
        assert_eq!(caps[0].attributes[1].name, "vendor");
    }

    #[test]
    fn test_one_capability_per_path() {
        let clause = &parse_header("a;b;version=1.0").unwrap()[0];
        let caps =
            build_capabilities(Namespace::Package, &ModuleId::from("m1"), clause).unwrap();
        assert_eq!(caps.len(), 2);
        assert_eq!(caps[0].attribute("package").unwrap().value.as_text(), "a");
        assert_eq!(caps[1].attribute("package").unwrap().value.as_text(), "b");
    }

    #[test]
    fn test_mandatory_attribute_flagged() {
        let clause = &parse_header("a;vendor=acme;mandatory:=vendor").unwrap()[0];
        let caps =
            build_capabilities(Namespace::Package, &ModuleId::from("m1"), clause).unwrap();
        assert!(caps[0].attribute("vendor").unwrap().mandatory);
        assert!(!caps[0].attribute("package").unwrap().mandatory);
    }

    #[test]
    fn test_missing_mandatory_attribute_fails() {
        let clause = &parse_header("a;mandatory:=foo").unwrap()[0];
        let err = build_capabilities(Namespace::Package, &ModuleId::from("m1"), clause)
            .unwrap_err();
        assert!(matches!(err, ManifestError::MalformedHeader { .. }));
    }

    #[test]
    fn test_uses_and_member_patterns() {
        let clause =
            &parse_header(r#"a;uses:="x,y";include:="Foo*";exclude:="FooImpl""#).unwrap()[0];
        let caps =
            build_capabilities(Namespace::Package, &ModuleId::from("m1"), clause).unwrap();
        assert_eq!(caps[0].uses, vec!["x", "y"]);
        assert_eq!(caps[0].include.as_deref(), Some(&["Foo*".to_string()][..]));
        assert_eq!(caps[0].exclude.as_deref(), Some(&["FooImpl".to_string()][..]));
    }

    #[test]
    fn test_requirement_filter_matches_range() {
        let clauses = parse_header(r#"org.example;version="[1.0,2.0)""#).unwrap();
        let normalized = normalize_imports(clauses, Dialect::Current, false).unwrap();
        let reqs = build_requirements(Namespace::Package, &ModuleId::from("m1"), &normalized[0]);
        assert_eq!(reqs.len(), 1);
        let filter = &reqs[0].filter;
        assert!(filter.matches(&props(&[("package", "org.example"), ("version", "1.5.0")])));
        assert!(!filter.matches(&props(&[("package", "org.example"), ("version", "2.0.0")])));
        assert!(!filter.matches(&props(&[("package", "org.example"), ("version", "0.9.0")])));
    }

    #[test]
    fn test_optional_resolution_directive() {
        let clause = &parse_header("org.example;resolution:=optional").unwrap()[0];
        let reqs = build_requirements(Namespace::Package, &ModuleId::from("m1"), clause);
        assert!(reqs[0].optional);
        assert_eq!(
            reqs[0].directives.get(DIRECTIVE_RESOLUTION).map(String::as_str),
            Some(RESOLUTION_OPTIONAL)
        );
    }

    #[test]
    fn test_requirement_not_optional_by_default() {
        let clause = &parse_header("org.example").unwrap()[0];
        let reqs = build_requirements(Namespace::Package, &ModuleId::from("m1"), clause);
        assert!(!reqs[0].optional);
    }
}
