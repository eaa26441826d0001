//! Error body construction and the `axum::IntoResponse` bridge for
//! [`ToolCallError`], grounded on the teacher server's `create_error_response`
//! helper (status + JSON body + CORS headers), but shaped to the RFC 9457
//! subset named in the external-interfaces section rather than JSON-RPC.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use toolcalls_tasks::ToolCallError;

use super::cors::add_cors_headers;

/// Wraps a [`ToolCallError`] so it can be returned directly from an axum
/// handler; `status_and_code` is the sole place a domain error is coupled
/// to the wire taxonomy, so this type does no further mapping of its own.
pub struct ApiError(pub ToolCallError);

impl From<ToolCallError> for ApiError {
    fn from(err: ToolCallError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.0.status_and_code();
        error_response(status, &code.to_string(), &self.0.to_string())
    }
}

/// Builds an error response body of shape `{"error":{"code","message"}}`.
pub fn error_response(status: u16, code: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({
        "error": {
            "code": code,
            "message": message,
        }
    });
    let mut resp = (status, Json(body)).into_response();
    add_cors_headers(resp.headers_mut());
    resp.headers_mut()
        .insert("Content-Type", HeaderValue::from_static("application/json"));
    resp
}
