//! Error types for ToolCall operations.
//!
//! Provides [`ToolCallError`], a rich error enum with contextual fields and
//! a single [`status_and_code`](ToolCallError::status_and_code) method that
//! couples domain errors to the HTTP error taxonomy. Backend and queue
//! errors are distinct enums ([`crate::store::StorageError`]) that convert
//! into `ToolCallError` at the store boundary; no backend-specific detail
//! crosses that conversion.

use std::fmt;

use crate::types::status::Status;

/// Stable wire identifier for an error, carried in the response body as
/// `error.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    PreconditionFailed,
    PreconditionRequired,
    RequestEntityTooLarge,
    UnsupportedMediaType,
    MethodNotAllowed,
    NotAcceptable,
    TooManyRequests,
    ServiceUnavailable,
    InternalServerError,
    NotAllowed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BadRequest => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "NotFound",
            Self::Conflict => "Conflict",
            Self::PreconditionFailed => "PreconditionFailed",
            Self::PreconditionRequired => "PreconditionRequired",
            Self::RequestEntityTooLarge => "RequestEntityTooLarge",
            Self::UnsupportedMediaType => "UnsupportedMediaType",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::NotAcceptable => "NotAcceptable",
            Self::TooManyRequests => "TooManyRequests",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::InternalServerError => "InternalServerError",
            Self::NotAllowed => "NotAllowed",
        };
        write!(f, "{s}")
    }
}

/// Errors that can occur during ToolCall operations.
///
/// Each variant carries the context needed to log without string-matching.
/// Use [`status_and_code`](ToolCallError::status_and_code) to map to an HTTP
/// status and wire error code; that method is the sole place a domain error
/// is coupled to the wire format.
#[derive(Debug)]
pub enum ToolCallError {
    /// Attempted an invalid state machine transition.
    InvalidTransition {
        tool_call_id: String,
        from: Status,
        to: Status,
    },

    /// ToolCall with the given id was not found (or belongs to another tenant).
    NotFound { tool_call_id: String },

    /// ToolCall has passed its `expiration` timestamp.
    Expired {
        tool_call_id: String,
        expired_at: String,
    },

    /// `Idempotency-Key` on a PUT did not match the key stored on first create.
    IdempotencyKeyConflict { tool_call_id: String },

    /// `If-Match`/`If-None-Match` did not match the current ETag.
    PreconditionFailed {
        tool_call_id: String,
        expected: String,
        actual: String,
    },

    /// A write was attempted without a required precondition header.
    PreconditionRequired { detail: String },

    /// Request body failed validation (missing field, wrong shape, bad header).
    BadRequest { detail: String },

    /// `Authorization` header missing or did not match the configured key.
    Unauthorized,

    /// No handler registered for the named tool.
    UnknownTool { tool_name: String },

    /// The requested operation does not apply to the ToolCall's current status
    /// (e.g. `advance` on a ToolCall not in an awaiting state).
    NotAllowed { tool_call_id: String, detail: String },

    /// Request body exceeded the configured size limit.
    RequestEntityTooLarge { limit_bytes: usize, actual_bytes: usize },

    /// `Content-Type` was missing or not `application/json`.
    UnsupportedMediaType { content_type: String },

    /// `Api-Version` did not match a registered version.
    UnsupportedApiVersion { requested: String },

    /// The server is draining in-flight requests and rejecting new ones.
    ShuttingDown,

    /// Backend storage error, already translated from `StorageError`.
    Store(String),

    /// Opaque server-data envelope failed to decode or authenticate.
    Envelope(String),
}

impl fmt::Display for ToolCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition {
                tool_call_id,
                from,
                to,
            } => write!(
                f,
                "invalid transition from {from} to {to} for tool call {tool_call_id}"
            ),
            Self::NotFound { tool_call_id } => write!(f, "tool call not found: {tool_call_id}"),
            Self::Expired {
                tool_call_id,
                expired_at,
            } => write!(f, "tool call expired: {tool_call_id} (expired at {expired_at})"),
            Self::IdempotencyKeyConflict { tool_call_id } => {
                write!(f, "idempotency key conflict for tool call {tool_call_id}")
            }
            Self::PreconditionFailed {
                tool_call_id,
                expected,
                actual,
            } => write!(
                f,
                "precondition failed for tool call {tool_call_id}: expected etag {expected}, found {actual}"
            ),
            Self::PreconditionRequired { detail } => {
                write!(f, "precondition required: {detail}")
            }
            Self::BadRequest { detail } => write!(f, "bad request: {detail}"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::UnknownTool { tool_name } => write!(f, "unknown tool: {tool_name}"),
            Self::NotAllowed { tool_call_id, detail } => {
                write!(f, "not allowed for tool call {tool_call_id}: {detail}")
            }
            Self::RequestEntityTooLarge {
                limit_bytes,
                actual_bytes,
            } => write!(
                f,
                "request entity too large: {actual_bytes} bytes exceeds {limit_bytes} byte limit"
            ),
            Self::UnsupportedMediaType { content_type } => {
                write!(f, "unsupported media type: {content_type}")
            }
            Self::UnsupportedApiVersion { requested } => {
                write!(f, "unsupported api version: {requested}")
            }
            Self::ShuttingDown => write!(f, "server is shutting down"),
            Self::Store(msg) => write!(f, "store error: {msg}"),
            Self::Envelope(msg) => write!(f, "envelope error: {msg}"),
        }
    }
}

impl std::error::Error for ToolCallError {}

impl ToolCallError {
    /// Maps this error to an `(http_status, ErrorCode)` pair. The sole place
    /// a domain error is coupled to the wire taxonomy.
    pub fn status_and_code(&self) -> (u16, ErrorCode) {
        match self {
            Self::InvalidTransition { .. } => (400, ErrorCode::BadRequest),
            Self::NotFound { .. } | Self::UnknownTool { .. } => (404, ErrorCode::NotFound),
            Self::Expired { .. } => (404, ErrorCode::NotFound),
            Self::IdempotencyKeyConflict { .. } => (409, ErrorCode::Conflict),
            Self::PreconditionFailed { .. } => (412, ErrorCode::PreconditionFailed),
            Self::PreconditionRequired { .. } => (428, ErrorCode::PreconditionRequired),
            Self::BadRequest { .. } => (400, ErrorCode::BadRequest),
            Self::Unauthorized => (401, ErrorCode::Unauthorized),
            Self::NotAllowed { .. } => (400, ErrorCode::NotAllowed),
            Self::RequestEntityTooLarge { .. } => (413, ErrorCode::RequestEntityTooLarge),
            Self::UnsupportedMediaType { .. } => (415, ErrorCode::UnsupportedMediaType),
            Self::UnsupportedApiVersion { .. } => (400, ErrorCode::BadRequest),
            Self::ShuttingDown => (503, ErrorCode::ServiceUnavailable),
            Self::Store(_) | Self::Envelope(_) => (500, ErrorCode::InternalServerError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ToolCallError::NotFound {
            tool_call_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "tool call not found: abc");

        let err = ToolCallError::PreconditionFailed {
            tool_call_id: "t".to_string(),
            expected: "e1".to_string(),
            actual: "e2".to_string(),
        };
        assert!(err.to_string().contains("e1"));
        assert!(err.to_string().contains("e2"));
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ToolCallError::NotFound {
                tool_call_id: "t".to_string()
            }
            .status_and_code()
            .0,
            404
        );
        assert_eq!(
            ToolCallError::PreconditionFailed {
                tool_call_id: "t".to_string(),
                expected: "a".to_string(),
                actual: "b".to_string(),
            }
            .status_and_code()
            .0,
            412
        );
        assert_eq!(
            ToolCallError::IdempotencyKeyConflict {
                tool_call_id: "t".to_string()
            }
            .status_and_code()
            .0,
            409
        );
        assert_eq!(ToolCallError::Unauthorized.status_and_code().0, 401);
        assert_eq!(ToolCallError::ShuttingDown.status_and_code().0, 503);
    }

    #[test]
    fn error_code_display_matches_wire_symbol() {
        assert_eq!(ErrorCode::PreconditionFailed.to_string(), "PreconditionFailed");
        assert_eq!(ErrorCode::NotAllowed.to_string(), "NotAllowed");
    }
}
