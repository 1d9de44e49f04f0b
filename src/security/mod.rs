//! Security module.
//!
//! Provides sensitive-field stripping for datalayer records.

pub mod sanitizer;

pub use sanitizer::*;
