//! LATTICE Matching Filters
//!
//! The boolean filter algebra used to match requirements against
//! capability attributes and to admit or reject native-code clauses.
//! Deliberately small: version bounds, equality, and substring patterns
//! combined with and/or/not — nothing more.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compile;
pub mod expr;
pub mod parse;

pub use compile::compile_attributes;
pub use expr::Filter;
pub use parse::parse_filter;
