//! Router construction and server lifecycle.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::pipeline::context::HEADER_REFERER;
use crate::pipeline::ingestion::{handle_ingress, IngressState};
use crate::routing::response::cors_headers;
use crate::validation::origin::match_origin;

/// Build the application router.
///
/// Any method on any path reaches the ingress handler, so `OPTIONS` and
/// non-`POST` methods get the same CORS-bearing responses as everything else.
pub fn create_router(state: Arc<IngressState>) -> Router {
    Router::new()
        .route("/health", get(health_check).fallback(handle_ingress))
        .fallback(handle_ingress)
        .with_state(state)
}

/// Liveness check. Carries the same CORS headers as every other response.
async fn health_check(
    State(state): State<Arc<IngressState>>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap, Json<Value>) {
    let referer = headers
        .get(HEADER_REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let origin = match_origin(referer, &state.config.allowed_origins).unwrap_or("");

    (StatusCode::OK, cors_headers(origin), Json(json!({ "status": "ok" })))
}

/// Serve until Ctrl-C or SIGTERM, then drain in-flight requests.
pub async fn start_server(state: Arc<IngressState>, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("SERVER_LISTENING addr={}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("SERVER_STOPPED");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("SIGNAL_HANDLER_FAILED signal=ctrl_c error={}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("SIGNAL_HANDLER_FAILED signal=sigterm error={}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("SHUTDOWN_SIGNAL_RECEIVED");
}
