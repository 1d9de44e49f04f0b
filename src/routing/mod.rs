//! HTTP routing and response mapping.
//!
//! Every path is served by the ingress handler; `GET /health` additionally
//! answers liveness checks.

pub mod response;
pub mod router;

pub use response::*;
pub use router::*;
