//! Field extraction from request bodies.
//!
//! Builds the synthesized fallback record when a body carries no datalayer.

pub mod fallback;

pub use fallback::*;
