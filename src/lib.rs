//! Datalayer Ingress - browser analytics collection endpoint
//!
//! Receives client-side datalayer events, checks the caller's origin and
//! shared token, strips configured personally-identifiable fields, and
//! relays the sanitized batch to the data store's REST interface.
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `pipeline` - Request orchestrator (gates, sanitize, relay)
//! - `validation` - Origin, token, and payload gates
//! - `extraction` - Fallback record synthesis
//! - `security` - Sensitive-field stripping
//! - `storage` - Relay client and wire models for the data store
//! - `routing` - Axum router and response mapping
//! - `config` - Process-lifetime configuration
//! - `logging` - Structured logging with request context

pub mod config;
pub mod error;
pub mod extraction;
pub mod logging;
pub mod pipeline;
pub mod routing;
pub mod security;
pub mod storage;
pub mod validation;

pub use config::{IngressConfig, PayloadPolicy};
pub use error::{ConfigError, IngressError, RelayError};
pub use pipeline::ingestion::{handle_ingress, IngressOutcome, IngressState};
pub use routing::router::{create_router, start_server};

/// Initialize the process-wide logger.
///
/// Defaults to `info`; `RUST_LOG` overrides it.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
