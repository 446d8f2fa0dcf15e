//! LATTICE Manifest Compiler
//!
//! Turns a module's textual metadata headers into a typed graph of
//! capabilities and requirements: quote-aware clause structuring,
//! per-header normalization across the legacy and current dialects,
//! capability/requirement materialization with compiled matching
//! filters, and native-clause selection for one platform.
//!
//! Compilation is all-or-nothing: a descriptor either compiles whole or
//! fails with a typed [`ManifestError`](lattice_core::ManifestError).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capability;
pub mod clause;
pub mod descriptor;
pub mod normalize;

pub use capability::{
    build_capabilities, build_requirements, Capability, Namespace, Requirement,
};
pub use clause::{parse_header, Clause};
pub use descriptor::{header, ActivationPolicy, DescriptorCompiler, ModuleDescriptor};
pub use normalize::Dialect;
