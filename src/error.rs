// Error envelope shared by all web-facing errors in the service
// Keeps the JSON error shape consistent across domains

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;

/// Consistent error response structure
///
/// Provides both a machine-readable `error_code` and a human-readable
/// `message`. Sensitive internals are never placed here; they are logged
/// server-side by the error type that builds the response.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "INVALID_SELECTION")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    /// Omitted from JSON when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

/// Build a JSON error response with no extra details
pub fn error_response(status: StatusCode, error_code: &str, message: impl Into<String>) -> Response {
    error_response_with_details(status, error_code, message, None)
}

/// Build a JSON error response carrying structured details
pub fn error_response_with_details(
    status: StatusCode,
    error_code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> Response {
    let body = ErrorResponse {
        error_code: error_code.to_string(),
        message: message.into(),
        details,
        timestamp: Utc::now().to_rfc3339(),
    };
    (status, Json(body)).into_response()
}
