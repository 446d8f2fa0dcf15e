//! Per-header-kind normalization rules.
//!
//! Each header kind gets a pure function from structured clauses to
//! normalized clauses; the descriptor compiler dispatches through a
//! fixed match on the header name. Dialect governs strictness: the
//! legacy dialect tolerates and drops what it does not understand,
//! the current dialect fails hard.

use crate::clause::Clause;
use lattice_core::{AttributeValue, ManifestError, ManifestResult, Version, VersionRange};
use serde::{Deserialize, Serialize};

/// Reserved root namespace: packages under it are never imported or
/// exported by modules.
pub const RESERVED_ROOT: &str = "system.";

/// The `version` attribute name
pub const ATTR_VERSION: &str = "version";
/// The legacy `specification-version` attribute name
pub const ATTR_SPECIFICATION_VERSION: &str = "specification-version";
/// The injected owning-module attribute name on export clauses
pub const ATTR_MODULE: &str = "module";
/// The injected owning-module-version attribute name on export clauses
pub const ATTR_MODULE_VERSION: &str = "module-version";
/// The `uses` directive name
pub const DIRECTIVE_USES: &str = "uses";

/// Metadata dialect a descriptor declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// The legacy generation: no directives, specification-version,
    /// single-classspace implicit imports
    Legacy,
    /// The current generation: symbolic names, directives, typed ranges
    Current,
}

impl Dialect {
    /// Derive the dialect from the `manifest-version` header value
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::MalformedHeader`] for any declared value
    /// other than `2`.
    pub fn from_manifest_version(value: Option<&str>) -> ManifestResult<Self> {
        match value.map(str::trim) {
            None => Ok(Self::Legacy),
            Some("2") => Ok(Self::Current),
            Some(other) => Err(ManifestError::malformed(format!(
                "unknown manifest version: {other}"
            ))),
        }
    }
}

fn check_not_reserved(path: &str, header: &str) -> ManifestResult<()> {
    if path.starts_with(RESERVED_ROOT) {
        return Err(ManifestError::malformed(format!(
            "{header} of reserved package not allowed: {path}"
        )));
    }
    Ok(())
}

/// Fold `specification-version` into `version`, erroring on a textual
/// mismatch between the two.
fn reconcile_version_attributes(clause: &mut Clause) -> ManifestResult<()> {
    let Some(spec) = clause.attributes.shift_remove(ATTR_SPECIFICATION_VERSION) else {
        return Ok(());
    };
    match clause.attributes.get(ATTR_VERSION).map(AttributeValue::as_text) {
        Some(current) => {
            if current.trim() != spec.as_text().trim() {
                return Err(ManifestError::malformed(format!(
                    "version and specification-version disagree: {} vs {}",
                    current,
                    spec.as_text()
                )));
            }
        }
        None => {
            clause.attributes.insert(ATTR_VERSION.to_string(), spec);
        }
    }
    Ok(())
}

fn coerce_version_to_range(clause: &mut Clause) -> ManifestResult<()> {
    let Some(text) = clause.attributes.get(ATTR_VERSION).map(AttributeValue::as_text) else {
        return Ok(());
    };
    let range = VersionRange::parse(&text)?;
    clause
        .attributes
        .insert(ATTR_VERSION.to_string(), AttributeValue::Range(range));
    Ok(())
}

fn drop_unknown_legacy_attributes(clause: &mut Clause, header: &str) {
    clause.attributes.retain(|name, _| {
        let known = name == ATTR_VERSION || name == ATTR_SPECIFICATION_VERSION;
        if !known {
            tracing::warn!(header, attribute = %name, "dropping unknown legacy attribute");
        }
        known
    });
}

/// Whether a dynamic-import path is a legal pattern: an exact package,
/// a whole trailing segment wildcard, or the bare wildcard.
fn check_dynamic_pattern(path: &str) -> ManifestResult<()> {
    if path == "*" {
        return Ok(());
    }
    let prefix = match path.strip_suffix(".*") {
        Some(prefix) => prefix,
        None => path,
    };
    if prefix.is_empty() || prefix.contains('*') {
        return Err(ManifestError::malformed(format!(
            "dynamic import wildcard must be a whole trailing segment: {path}"
        )));
    }
    Ok(())
}

/// Normalize `import` or `dynamic-import` clauses
///
/// # Errors
///
/// Returns [`ManifestError::UnsupportedDialect`] for directives (or, on
/// dynamic imports, any decoration at all) under the legacy dialect, and
/// [`ManifestError::MalformedHeader`] for reserved packages, bad wildcard
/// patterns, or a version/specification-version mismatch.
pub fn normalize_imports(
    mut clauses: Vec<Clause>,
    dialect: Dialect,
    dynamic: bool,
) -> ManifestResult<Vec<Clause>> {
    for clause in &mut clauses {
        if dialect == Dialect::Legacy {
            if dynamic && !(clause.directives.is_empty() && clause.attributes.is_empty()) {
                return Err(ManifestError::dialect(
                    "legacy dynamic imports cannot carry directives or attributes",
                ));
            }
            if !clause.directives.is_empty() {
                return Err(ManifestError::dialect(
                    "legacy imports cannot carry directives",
                ));
            }
            drop_unknown_legacy_attributes(clause, "import");
        }

        reconcile_version_attributes(clause)?;
        coerce_version_to_range(clause)?;

        for path in &clause.paths {
            check_not_reserved(path, "import")?;
            if dynamic {
                check_dynamic_pattern(path)?;
            } else if path.contains('*') {
                return Err(ManifestError::malformed(format!(
                    "import package name cannot contain a wildcard: {path}"
                )));
            }
        }
    }
    Ok(clauses)
}

/// Normalize `export` clauses
///
/// The version attribute defaults to `0.0.0` and is coerced to a plain
/// [`Version`]. Under the current dialect the owning module's identity
/// attributes are injected; declaring them explicitly is an error.
///
/// # Errors
///
/// Returns [`ManifestError::UnsupportedDialect`] for directives under the
/// legacy dialect and [`ManifestError::MalformedHeader`] for reserved
/// packages, unparsable versions, or explicit identity attributes.
pub fn normalize_exports(
    mut clauses: Vec<Clause>,
    dialect: Dialect,
    module_name: Option<&str>,
    module_version: &Version,
) -> ManifestResult<Vec<Clause>> {
    for clause in &mut clauses {
        if dialect == Dialect::Legacy {
            if !clause.directives.is_empty() {
                return Err(ManifestError::dialect(
                    "legacy exports cannot carry directives",
                ));
            }
            drop_unknown_legacy_attributes(clause, "export");
        }

        reconcile_version_attributes(clause)?;
        let version = match clause.attributes.get(ATTR_VERSION) {
            Some(value) => Version::parse(&value.as_text())?,
            None => Version::default(),
        };
        clause
            .attributes
            .insert(ATTR_VERSION.to_string(), AttributeValue::Version(version));

        if dialect == Dialect::Current {
            for reserved in [ATTR_MODULE, ATTR_MODULE_VERSION] {
                if clause.attributes.contains_key(reserved) {
                    return Err(ManifestError::malformed(format!(
                        "export clause cannot declare the {reserved} attribute explicitly"
                    )));
                }
            }
            if let Some(name) = module_name {
                clause.attributes.insert(
                    ATTR_MODULE.to_string(),
                    AttributeValue::Text(name.to_string()),
                );
                clause.attributes.insert(
                    ATTR_MODULE_VERSION.to_string(),
                    AttributeValue::Version(module_version.clone()),
                );
            }
        }

        for path in &clause.paths {
            check_not_reserved(path, "export")?;
            if path.contains('*') {
                return Err(ManifestError::malformed(format!(
                    "export package name cannot contain a wildcard: {path}"
                )));
            }
        }
    }
    Ok(clauses)
}

/// Normalize `require` clauses
///
/// The legacy dialect has no module-to-module requirements; the header is
/// dropped whole with a warning.
///
/// # Errors
///
/// Returns [`ManifestError::MalformedHeader`] for an unparsable version
/// range under the current dialect.
pub fn normalize_requires(
    mut clauses: Vec<Clause>,
    dialect: Dialect,
) -> ManifestResult<Vec<Clause>> {
    if dialect == Dialect::Legacy {
        if !clauses.is_empty() {
            tracing::warn!("dropping require header: not part of the legacy dialect");
        }
        return Ok(Vec::new());
    }
    for clause in &mut clauses {
        coerce_version_to_range(clause)?;
    }
    Ok(clauses)
}

/// Normalize the `fragment-host` header: at most one clause with one
/// host name, its version attribute coerced to a range.
///
/// # Errors
///
/// Returns [`ManifestError::MalformedHeader`] on multiple clauses, more
/// than one host name, or an unparsable version range.
pub fn normalize_fragment_host(mut clauses: Vec<Clause>) -> ManifestResult<Option<Clause>> {
    if clauses.len() > 1 {
        return Err(ManifestError::malformed(
            "fragment-host allows at most one clause",
        ));
    }
    let Some(mut clause) = clauses.pop() else {
        return Ok(None);
    };
    if clause.paths.len() != 1 {
        return Err(ManifestError::malformed(
            "fragment-host allows exactly one host name",
        ));
    }
    coerce_version_to_range(&mut clause)?;
    Ok(Some(clause))
}

/// Normalize the `symbolic-name` header: at most one clause with one name
///
/// # Errors
///
/// Returns [`ManifestError::MalformedHeader`] on multiple clauses or
/// multiple names, and requires the header under the current dialect.
pub fn normalize_symbolic_name(
    mut clauses: Vec<Clause>,
    dialect: Dialect,
) -> ManifestResult<Option<Clause>> {
    if clauses.len() > 1 {
        return Err(ManifestError::malformed(
            "symbolic-name allows at most one clause",
        ));
    }
    let clause = clauses.pop();
    match &clause {
        Some(c) if c.paths.len() != 1 => Err(ManifestError::malformed(
            "symbolic-name allows exactly one name",
        )),
        None if dialect == Dialect::Current => Err(ManifestError::malformed(
            "symbolic-name is required under the current dialect",
        )),
        _ => Ok(clause),
    }
}

/// Legacy single-classspace inference
///
/// Every exported package not explicitly imported gains a synthesized
/// import clause (the export's version becoming an inclusive floor), and
/// every export clause gains a `uses` directive listing the union of
/// explicit and implicit import names in declaration order.
pub fn infer_legacy_imports(imports: &mut Vec<Clause>, exports: &mut [Clause]) {
    let mut union: Vec<String> = imports
        .iter()
        .flat_map(|clause| clause.paths.iter().cloned())
        .collect();

    for export in exports.iter() {
        for path in &export.paths {
            if union.contains(path) {
                continue;
            }
            let floor = match export.attributes.get(ATTR_VERSION) {
                Some(AttributeValue::Version(v)) => v.clone(),
                _ => Version::default(),
            };
            let mut implicit = Clause::from_paths(vec![path.clone()]);
            implicit.attributes.insert(
                ATTR_VERSION.to_string(),
                AttributeValue::Range(VersionRange::at_least(floor)),
            );
            tracing::debug!(package = %path, "synthesizing implicit legacy import");
            imports.push(implicit);
            union.push(path.clone());
        }
    }

    if union.is_empty() {
        return;
    }
    let uses = union.join(",");
    for export in exports.iter_mut() {
        export
            .directives
            .insert(DIRECTIVE_USES.to_string(), uses.clone());
    }
}
