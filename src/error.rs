//! Error taxonomy for the ingress endpoint.
//!
//! Every request-level failure is terminal and maps to exactly one HTTP
//! status and one fixed client-facing message.

use axum::http::StatusCode;
use thiserror::Error;

/// Failure of the outbound relay call to the data store.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay timed out after {0}s")]
    Timeout(u64),

    #[error("relay transport error: {0}")]
    Transport(String),

    #[error("data store answered with status {0}")]
    Status(u16),
}

/// Request-level failures, in the order the gates are evaluated.
#[derive(Debug, Error)]
pub enum IngressError {
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("referer does not match any allowed origin")]
    InvalidReferer,

    #[error("client token missing or mismatched")]
    InvalidToken,

    #[error("datalayer array missing from payload")]
    MissingDatalayer,

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("upstream failure: {0}")]
    UpstreamFailure(#[from] RelayError),
}

impl IngressError {
    /// HTTP status for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidReferer | Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::MissingDatalayer => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field of the response body.
    ///
    /// Internal detail (relay status, sizes) stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed(_) => "Method not allowed",
            Self::InvalidReferer => "Forbidden - invalid referer",
            Self::InvalidToken => "Forbidden - invalid token",
            Self::MissingDatalayer => "Invalid payload: datalayer array missing",
            Self::PayloadTooLarge(_) => "Payload too large",
            Self::UpstreamFailure(_) => "Failed to save to Supabase",
        }
    }
}

/// Configuration could not be assembled at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required setting {0} is missing or empty")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
