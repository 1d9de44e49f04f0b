//! Request validation gates.
//!
//! Applied in order before anything is relayed:
//! - Referer prefix match against the origin allow-list
//! - Shared client token comparison
//! - Payload shape (strict / lenient policy) and record-count limit

pub mod origin;
pub mod payload;
pub mod token;

pub use origin::*;
pub use payload::*;
pub use token::*;
