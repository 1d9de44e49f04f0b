//! Datalayer ingress service.
//!
//! Loads configuration from the environment and serves the ingress
//! endpoint until shut down.

use std::sync::Arc;

use anyhow::{Context, Result};
use datalayer_ingress::{init_logger, start_server, IngressConfig, IngressState};

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let config = IngressConfig::from_env().context("failed to load configuration")?;
    log::info!(
        "CONFIG_LOADED store_url={} origins={:?} sensitive_keys={} policy={} relay_timeout_secs={}",
        config.store_url,
        config.allowed_origins,
        config.sensitive_keys.len(),
        config.payload_policy,
        config.relay_timeout.as_secs()
    );

    let addr = config.bind_addr;
    let state = IngressState::new(config).context("failed to build relay client")?;

    start_server(Arc::new(state), addr)
        .await
        .with_context(|| format!("server on {} failed", addr))?;

    log::info!("SHUTDOWN_COMPLETE");
    Ok(())
}
