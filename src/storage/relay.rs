//! Outbound relay to the data store.
//!
//! One POST per accepted request, authenticated with the service credential
//! in both the `apikey` and `Authorization: Bearer` headers. No retries; any
//! non-2xx status, transport error, or timeout is a relay failure.

use std::time::{Duration, Instant};

use crate::config::IngressConfig;
use crate::error::RelayError;
use crate::logging::structured::LogContext;

use super::models::{RelayPayload, DATALAYER_RESOURCE};

/// HTTP client for the store's REST endpoint.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct StoreRelay {
    client: reqwest::Client,
    endpoint: String,
    service_key: String,
    timeout: Duration,
}

impl StoreRelay {
    /// Build the relay client from configuration.
    pub fn new(config: &IngressConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(config.relay_timeout)
            .user_agent(concat!("datalayer-ingress/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/rest/v1/{}",
                config.store_url.trim_end_matches('/'),
                DATALAYER_RESOURCE
            ),
            service_key: config.service_key.clone(),
            timeout: config.relay_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post the sanitized batch to the store.
    pub async fn relay(&self, payload: &RelayPayload, ctx: &LogContext) -> Result<(), RelayError> {
        let start = Instant::now();

        log::debug!(
            "{} RELAY_START endpoint={} records={}",
            ctx,
            self.endpoint,
            payload.record_count()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::Timeout(self.timeout.as_secs())
                } else {
                    RelayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let elapsed_ms = start.elapsed().as_millis();

        if !status.is_success() {
            log::warn!(
                "{} RELAY_REJECTED status={} duration_ms={}",
                ctx,
                status.as_u16(),
                elapsed_ms
            );
            return Err(RelayError::Status(status.as_u16()));
        }

        log::info!(
            "{} RELAY_COMPLETE status={} records={} duration_ms={}",
            ctx,
            status.as_u16(),
            payload.record_count(),
            elapsed_ms
        );
        Ok(())
    }
}
