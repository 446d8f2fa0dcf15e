//! LATTICE Native-Code Selection
//!
//! Parses `native-code` header clauses, canonicalizes platform
//! descriptors through fixed lookup tables, and deterministically selects
//! at most one clause for the running platform.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clause;
pub mod platform;
pub mod select;

pub use clause::{parse_native_header, NativeClause, NativeHeader};
pub use platform::Platform;
pub use select::select_clause;
