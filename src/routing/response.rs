//! Outcome to HTTP response mapping.
//!
//! The three CORS headers are attached to every response, including
//! errors and preflight.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::IngressError;
use crate::pipeline::ingestion::IngressOutcome;

pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, x-client-token";

/// Body of a successful relay.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Body of any rejected request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// CORS headers echoing the matched origin (empty when none matched).
pub fn cors_headers(allowed_origin: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_str(allowed_origin).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    headers
}

/// Build the final response for a pipeline result.
pub fn build_response(result: &Result<IngressOutcome, IngressError>, allowed_origin: &str) -> Response {
    let headers = cors_headers(allowed_origin);

    match result {
        Ok(IngressOutcome::Preflight) => (StatusCode::OK, headers).into_response(),
        Ok(IngressOutcome::Relayed { .. }) => {
            (StatusCode::OK, headers, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => (
            e.status(),
            headers,
            Json(ErrorResponse {
                error: e.public_message(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_cors_headers_always_present() {
        let headers = cors_headers("");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, x-client-token"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "");
    }

    #[tokio::test]
    async fn test_preflight_has_empty_body() {
        let response = build_response(&Ok(IngressOutcome::Preflight), "https://seusite.com");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://seusite.com"
        );
        assert_eq!(body_of(response).await, "");
    }

    #[tokio::test]
    async fn test_success_body() {
        let outcome = IngressOutcome::Relayed { records: 2, fields_removed: 0 };
        let response = build_response(&Ok(outcome), "https://seusite.com");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn test_error_bodies() {
        let cases = vec![
            (IngressError::MethodNotAllowed("PUT".into()), 405, "Method not allowed"),
            (IngressError::InvalidReferer, 403, "Forbidden - invalid referer"),
            (IngressError::InvalidToken, 403, "Forbidden - invalid token"),
            (IngressError::MissingDatalayer, 400, "Invalid payload: datalayer array missing"),
            (IngressError::PayloadTooLarge("x".into()), 413, "Payload too large"),
            (
                IngressError::UpstreamFailure(RelayError::Status(502)),
                500,
                "Failed to save to Supabase",
            ),
        ];

        for (err, status, message) in cases {
            let response = build_response(&Err(err), "");
            assert_eq!(response.status().as_u16(), status);
            assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "");
            assert_eq!(body_of(response).await, format!(r#"{{"error":"{}"}}"#, message));
        }
    }
}
