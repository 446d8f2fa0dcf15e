//! LATTICE Core Types
//!
//! This crate contains pure types and logic with no I/O: module versions
//! and version ranges, opaque module identifiers, clause attribute values,
//! the shared error type, and the quote-aware header tokenizer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod error;
pub mod id;
pub mod range;
pub mod tokenize;
pub mod version;

// Re-exports
pub use attribute::{Attribute, AttributeValue, Directive};
pub use error::{ManifestError, ManifestResult};
pub use id::ModuleId;
pub use range::VersionRange;
pub use tokenize::split_delimited;
pub use version::Version;
