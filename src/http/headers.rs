//! Typed header unmarshaling (§4.6): pulls the headers this service reads
//! out of an `axum::http::HeaderMap` into one struct, so routes never parse
//! raw header strings themselves.

use axum::http::HeaderMap;

use super::precondition::RequestConditionals;

/// Headers the framing shell understands, parsed once per request.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    pub api_version: Option<String>,
    pub idempotency_key: Option<String>,
    pub conditionals: RequestConditionals,
    pub content_type: Option<String>,
    pub content_length: Option<usize>,
    pub accept: Option<String>,
    pub authorization: Option<String>,
}

impl RequestHeaders {
    pub fn parse(headers: &HeaderMap) -> Self {
        Self {
            api_version: header_str(headers, "api-version"),
            idempotency_key: header_str(headers, "idempotency-key"),
            conditionals: RequestConditionals {
                if_match: header_str(headers, "if-match"),
                if_none_match: header_str(headers, "if-none-match"),
            },
            content_type: header_str(headers, "content-type"),
            content_length: header_str(headers, "content-length").and_then(|v| v.parse().ok()),
            accept: header_str(headers, "accept"),
            authorization: header_str(headers, "authorization"),
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name)?.to_str().ok().map(str::to_string)
}
