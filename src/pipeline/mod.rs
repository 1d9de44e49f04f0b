//! Request pipeline.
//!
//! Runs the ingress gates in order:
//! - CORS preflight and method check
//! - Origin allow-list and client token
//! - Payload shape and record limit
//! - Sanitization
//! - Relay to the data store

pub mod context;
pub mod ingestion;

pub use context::*;
pub use ingestion::*;
