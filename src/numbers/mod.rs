//! Number list input
//!
//! Reads a line-oriented number list and yields normalized numbers ready
//! for lookup.

pub mod source;

pub use source::{normalize, InputError, NumberQuery, NumberSource};
