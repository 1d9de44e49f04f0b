//! Main datalayer ingestion pipeline.
//!
//! Coordinates one request from arrival to response:
//! 1. CORS preflight
//! 2. Method gate
//! 3. Origin gate (referer prefix)
//! 4. Token gate
//! 5. Payload gate / fallback
//! 6. Size gate
//! 7. Sanitization
//! 8. Relay
//! 9. Outcome mapping
//!
//! The matched origin is computed before any branch so every response,
//! error or not, echoes it in the CORS headers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    response::Response,
};

use crate::config::IngressConfig;
use crate::error::{IngressError, RelayError};
use crate::routing::response::build_response;
use crate::security::sanitizer::sanitize_batch;
use crate::storage::models::RelayPayload;
use crate::storage::relay::StoreRelay;
use crate::validation::origin::match_origin;
use crate::validation::payload::{parse_body, resolve_payload};
use crate::validation::token::{token_fingerprint, verify_client_token};
use crate::{log_debug, log_error, log_info, log_warn};

use super::context::RequestContext;

/// Immutable state shared by every request.
#[derive(Debug)]
pub struct IngressState {
    pub config: IngressConfig,
    pub relay: StoreRelay,
}

impl IngressState {
    pub fn new(config: IngressConfig) -> Result<Self, RelayError> {
        let relay = StoreRelay::new(&config)?;
        Ok(Self { config, relay })
    }
}

/// Successful terminal states of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngressOutcome {
    /// `OPTIONS` answered with CORS headers only.
    Preflight,
    /// Sanitized batch accepted by the store.
    Relayed { records: usize, fields_removed: usize },
}

/// Axum handler for every ingress path.
pub async fn handle_ingress(State(state): State<Arc<IngressState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let ctx = RequestContext::new(&parts.method, &parts.headers);
    let allowed_origin = match_origin(&ctx.referer, &state.config.allowed_origins);

    let result = process_request(&state, &ctx, allowed_origin, body).await;
    build_response(&result, allowed_origin.unwrap_or(""))
}

/// Run the gates, sanitize, and relay. Short-circuits on the first failure.
pub async fn process_request(
    state: &IngressState,
    ctx: &RequestContext,
    allowed_origin: Option<&str>,
    body: Body,
) -> Result<IngressOutcome, IngressError> {
    let config = &state.config;
    let log_ctx = match allowed_origin {
        Some(origin) => ctx.log_context().with_origin(origin),
        None => ctx.log_context(),
    };

    log_debug!(
        log_ctx,
        "REQUEST_RECEIVED",
        method = ctx.method.as_str(),
        content_type = ctx.content_type,
    );

    // [1] CORS PREFLIGHT
    if ctx.method == Method::OPTIONS {
        log_debug!(log_ctx, "PREFLIGHT");
        return Ok(IngressOutcome::Preflight);
    }

    // [2] METHOD GATE
    if ctx.method != Method::POST {
        log_warn!(log_ctx, "METHOD_REJECTED", method = ctx.method.as_str());
        return Err(IngressError::MethodNotAllowed(ctx.method.to_string()));
    }

    // [3] ORIGIN GATE
    if allowed_origin.is_none() {
        log_warn!(log_ctx, "REFERER_REJECTED", referer = ctx.referer);
        return Err(IngressError::InvalidReferer);
    }

    // [4] TOKEN GATE
    if !verify_client_token(ctx.client_token.as_deref(), &config.client_token) {
        let fingerprint = ctx
            .client_token
            .as_deref()
            .map(token_fingerprint)
            .unwrap_or_else(|| "none".to_string());
        log_warn!(log_ctx, "TOKEN_REJECTED", fingerprint = fingerprint);
        return Err(IngressError::InvalidToken);
    }

    // [5][6] PAYLOAD AND SIZE GATES
    let bytes = axum::body::to_bytes(body, config.max_body_bytes)
        .await
        .map_err(|e| {
            log_warn!(log_ctx, "BODY_READ_FAILED", limit = config.max_body_bytes, error = e.to_string());
            IngressError::PayloadTooLarge(format!(
                "body unreadable or over {} bytes",
                config.max_body_bytes
            ))
        })?;

    let body = parse_body(&bytes, &log_ctx);
    drop(bytes);
    let payload = resolve_payload(body, config.payload_policy, ctx.received_at, &log_ctx)?;
    let payload_kind = payload.kind();

    // [7] SANITIZATION
    let (sanitized, sanitization) =
        sanitize_batch(payload.into_records(), &config.sensitive_keys, &log_ctx);

    // [8] RELAY
    let relay_payload = RelayPayload::new(sanitized);
    if let Err(e) = state.relay.relay(&relay_payload, &log_ctx).await {
        log_error!(log_ctx, "RELAY_FAILED", error = e.to_string());
        return Err(IngressError::UpstreamFailure(e));
    }

    // [9] OUTCOME
    log_info!(
        log_ctx,
        "REQUEST_COMPLETE",
        payload = payload_kind,
        records = relay_payload.record_count(),
        fields_removed = sanitization.fields_removed,
    );

    Ok(IngressOutcome::Relayed {
        records: relay_payload.record_count(),
        fields_removed: sanitization.fields_removed,
    })
}
