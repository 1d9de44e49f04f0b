//! Data store relay.
//!
//! The backing store is reached through its REST interface only; this
//! module builds the wire body and performs the single outbound call.

pub mod models;
pub mod relay;

pub use models::*;
pub use relay::*;
