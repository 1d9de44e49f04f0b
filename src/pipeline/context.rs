//! Request context management.
//!
//! Captures the headers the gates need plus an id for log correlation.

use axum::http::{HeaderMap, Method};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

pub const HEADER_REFERER: &str = "referer";
pub const HEADER_CLIENT_TOKEN: &str = "x-client-token";
pub const HEADER_CONTENT_TYPE: &str = "content-type";

/// Context for a single inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub received_at: DateTime<Utc>,
    pub method: Method,
    /// Empty when absent or not valid UTF-8.
    pub referer: String,
    pub client_token: Option<String>,
    pub content_type: Option<String>,
}

impl RequestContext {
    pub fn new(method: &Method, headers: &HeaderMap) -> Self {
        let request_id = format!("req-{}", &Uuid::new_v4().simple().to_string()[..8]);

        Self {
            request_id,
            received_at: Utc::now(),
            method: method.clone(),
            referer: header_str(headers, HEADER_REFERER).unwrap_or_default(),
            client_token: header_str(headers, HEADER_CLIENT_TOKEN),
            content_type: header_str(headers, HEADER_CONTENT_TYPE),
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.request_id)
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
