//! CORS header helper, adapted from the teacher server's `add_cors_headers`.
//! This service doesn't negotiate a session or protocol-version header, so
//! the exposed header list is trimmed to what the ToolCall routes use.

use axum::http::{HeaderMap, HeaderValue};

pub fn add_cors_headers(headers: &mut HeaderMap) {
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, PUT, POST, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static(
            "Content-Type, Accept, Authorization, Api-Version, Idempotency-Key, If-Match, If-None-Match",
        ),
    );
    headers.insert("Access-Control-Expose-Headers", HeaderValue::from_static("ETag, Server-Request-Id"));
}
