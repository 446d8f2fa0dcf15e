//! Whole-descriptor compilation.
//!
//! Takes the full header map of one module and produces its typed
//! capability/requirement graph in a single all-or-nothing pass. Any
//! error aborts the compile; callers never see a partial graph.

use crate::capability::{
    build_capabilities, build_requirements, Capability, Namespace, Requirement,
};
use crate::clause::{parse_header, Clause};
use crate::normalize::{
    infer_legacy_imports, normalize_exports, normalize_fragment_host, normalize_imports,
    normalize_requires, normalize_symbolic_name, Dialect, ATTR_MODULE_VERSION,
};
use lattice_core::{AttributeValue, ManifestError, ManifestResult, ModuleId, Version};
use lattice_native::{parse_native_header, select_clause, NativeClause, NativeHeader, Platform};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Header names understood by the compiler
pub mod header {
    /// The module's symbolic name (single clause, single name)
    pub const SYMBOLIC_NAME: &str = "symbolic-name";
    /// The module's own version
    pub const VERSION: &str = "version";
    /// Static package imports
    pub const IMPORT: &str = "import";
    /// Package exports
    pub const EXPORT: &str = "export";
    /// Dynamic package imports, resolved lazily by the caller
    pub const DYNAMIC_IMPORT: &str = "dynamic-import";
    /// Module-to-module requirements
    pub const REQUIRE: &str = "require";
    /// Host declaration of a fragment module
    pub const FRAGMENT_HOST: &str = "fragment-host";
    /// Native library clauses
    pub const NATIVE_CODE: &str = "native-code";
    /// Metadata dialect marker
    pub const MANIFEST_VERSION: &str = "manifest-version";
    /// Eager/lazy activation declaration
    pub const ACTIVATION_POLICY: &str = "activation-policy";

    /// The complete fixed header-name set
    pub const ALL: &[&str] = &[
        SYMBOLIC_NAME,
        VERSION,
        IMPORT,
        EXPORT,
        DYNAMIC_IMPORT,
        REQUIRE,
        FRAGMENT_HOST,
        NATIVE_CODE,
        MANIFEST_VERSION,
        ACTIVATION_POLICY,
    ];
}

/// When the module's code becomes eligible to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ActivationPolicy {
    /// Activate as soon as the module is started
    #[default]
    Eager,
    /// Defer activation until first use
    Lazy {
        /// Directory patterns whose use triggers activation
        include: Vec<String>,
        /// Directory patterns exempt from triggering activation
        exclude: Vec<String>,
    },
}

/// The compiled metadata of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Identifier the caller assigned to this module
    pub module: ModuleId,
    /// Declared symbolic name, absent only under the legacy dialect
    pub symbolic_name: Option<String>,
    /// Declared module version, `0.0.0` when absent
    pub version: Version,
    /// Metadata dialect the descriptor declared
    pub dialect: Dialect,
    /// Offered capabilities, in declaration order
    pub capabilities: Vec<Capability>,
    /// Static requirements, in declaration order
    pub requirements: Vec<Requirement>,
    /// Dynamic package requirements, kept apart from the static list
    pub dynamic_requirements: Vec<Requirement>,
    /// Activation policy, eager unless declared otherwise
    pub activation: ActivationPolicy,
    /// Parsed native-code header, when declared
    pub native: Option<NativeHeader>,
    /// The clause selected for the compiling platform, when any
    pub selected_native: Option<NativeClause>,
}

/// Compiles header maps into module descriptors for one platform
#[derive(Debug, Clone)]
pub struct DescriptorCompiler {
    platform: Platform,
}

impl DescriptorCompiler {
    /// Compiler selecting native clauses for the given platform
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Compile one module's headers into its descriptor
    ///
    /// # Errors
    ///
    /// Returns the first [`ManifestError`] encountered; on error no
    /// descriptor is produced at all.
    pub fn compile(
        &self,
        module: ModuleId,
        headers: &BTreeMap<String, String>,
    ) -> ManifestResult<ModuleDescriptor> {
        for name in headers.keys() {
            if !header::ALL.contains(&name.as_str()) {
                tracing::warn!(header = %name, "ignoring unknown header");
            }
        }

        let dialect =
            Dialect::from_manifest_version(headers.get(header::MANIFEST_VERSION).map(String::as_str))?;
        let version = module_version(headers, dialect)?;

        let symbolic =
            normalize_symbolic_name(clauses_of(headers, header::SYMBOLIC_NAME)?, dialect)?;
        let symbolic_name = symbolic.as_ref().map(|c| c.paths[0].clone());

        let fragment_host = normalize_fragment_host(clauses_of(headers, header::FRAGMENT_HOST)?)?;

        let mut imports =
            normalize_imports(clauses_of(headers, header::IMPORT)?, dialect, false)?;
        let mut exports = normalize_exports(
            clauses_of(headers, header::EXPORT)?,
            dialect,
            symbolic_name.as_deref(),
            &version,
        )?;
        if dialect == Dialect::Legacy {
            infer_legacy_imports(&mut imports, &mut exports);
        }
        check_duplicate_imports(&imports)?;

        let dynamics =
            normalize_imports(clauses_of(headers, header::DYNAMIC_IMPORT)?, dialect, true)?;
        let requires = normalize_requires(clauses_of(headers, header::REQUIRE)?, dialect)?;

        let mut capabilities = Vec::new();
        if let Some(clause) = &symbolic {
            let mut identity = clause.clone();
            identity.attributes.insert(
                ATTR_MODULE_VERSION.to_string(),
                AttributeValue::Version(version.clone()),
            );
            capabilities.extend(build_capabilities(Namespace::Module, &module, &identity)?);
            // A fragment attaches to a host instead of being one.
            if fragment_host.is_none() {
                capabilities.extend(build_capabilities(Namespace::Host, &module, &identity)?);
            }
        }
        let mut exported = HashSet::new();
        for clause in &exports {
            for path in &clause.paths {
                if !exported.insert(path.clone()) {
                    tracing::debug!(package = %path, "duplicate export produces a distinct capability");
                }
            }
            capabilities.extend(build_capabilities(Namespace::Package, &module, clause)?);
        }

        let mut requirements = Vec::new();
        for clause in &imports {
            requirements.extend(build_requirements(Namespace::Package, &module, clause));
        }
        for clause in &requires {
            requirements.extend(build_requirements(Namespace::Module, &module, clause));
        }
        if let Some(host) = &fragment_host {
            requirements.extend(build_requirements(Namespace::Host, &module, host));
        }

        let dynamic_requirements = dynamics
            .iter()
            .flat_map(|clause| build_requirements(Namespace::Package, &module, clause))
            .collect();

        let activation = match headers.get(header::ACTIVATION_POLICY) {
            None => ActivationPolicy::default(),
            Some(value) => parse_activation(value)?,
        };

        let (native, selected_native) = match headers.get(header::NATIVE_CODE) {
            None => (None, None),
            Some(value) => {
                let parsed = parse_native_header(value)?;
                let selected = select_clause(&parsed, &self.platform)?.cloned();
                (Some(parsed), selected)
            }
        };

        Ok(ModuleDescriptor {
            module,
            symbolic_name,
            version,
            dialect,
            capabilities,
            requirements,
            dynamic_requirements,
            activation,
            native,
            selected_native,
        })
    }

}

/// The declared module version; under the legacy dialect a malformed
/// value degrades to `0.0.0` with a warning.
fn module_version(
    headers: &BTreeMap<String, String>,
    dialect: Dialect,
) -> ManifestResult<Version> {
    let Some(text) = headers.get(header::VERSION) else {
        return Ok(Version::default());
    };
    match Version::parse(text) {
        Ok(version) => Ok(version),
        Err(_) if dialect == Dialect::Legacy => {
            tracing::warn!(value = %text, "malformed legacy module version, using 0.0.0");
            Ok(Version::default())
        }
        Err(err) => Err(err),
    }
}

fn clauses_of(headers: &BTreeMap<String, String>, name: &str) -> ManifestResult<Vec<Clause>> {
    match headers.get(name) {
        Some(value) => parse_header(value),
        None => Ok(Vec::new()),
    }
}

fn check_duplicate_imports(imports: &[Clause]) -> ManifestResult<()> {
    let mut seen = HashSet::new();
    for clause in imports {
        for path in &clause.paths {
            if !seen.insert(path.as_str()) {
                return Err(ManifestError::malformed(format!(
                    "duplicate import of package: {path}"
                )));
            }
        }
    }
    Ok(())
}

fn parse_activation(value: &str) -> ManifestResult<ActivationPolicy> {
    let clauses = parse_header(value)?;
    if clauses.len() != 1 || clauses[0].paths.len() != 1 {
        return Err(ManifestError::malformed(
            "activation-policy allows exactly one clause with one value",
        ));
    }
    let clause = &clauses[0];
    match clause.paths[0].as_str() {
        "eager" => Ok(ActivationPolicy::Eager),
        "lazy" => Ok(ActivationPolicy::Lazy {
            include: directive_list(clause, crate::capability::DIRECTIVE_INCLUDE),
            exclude: directive_list(clause, crate::capability::DIRECTIVE_EXCLUDE),
        }),
        other => Err(ManifestError::malformed(format!(
            "unknown activation policy: {other}"
        ))),
    }
}

fn directive_list(clause: &Clause, name: &str) -> Vec<String> {
    clause
        .directives
        .get(name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
