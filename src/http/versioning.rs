//! API version routing (§4.6).
//!
//! Versions are ordered and each names the route table it serves; this
//! service ships exactly one live version plus the unversioned "empty"
//! table of debug endpoints (`/healthz`). `axum::Router`'s own longest-match
//! path engine already supplies the `{name}` pattern matching named in the
//! design notes, so this module only adds the header-level version check in
//! front of it rather than reimplementing a pattern engine.

use toolcalls_tasks::ToolCallError;

/// Ordered list of API versions this deployment currently serves.
#[derive(Debug, Clone)]
pub struct ApiVersions {
    supported: Vec<String>,
}

impl ApiVersions {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            supported: vec![current.into()],
        }
    }

    /// Validates a request's `Api-Version` header. `None` is accepted only
    /// by routes serving the unversioned "empty" table (debug endpoints);
    /// callers for versioned routes must pass `Some(header_value)`.
    /// The version this deployment currently serves (used to derive the
    /// constant `GET /mcp/tools` ETag).
    pub fn current(&self) -> &str {
        &self.supported[0]
    }

    pub fn validate(&self, requested: &str) -> Result<(), ToolCallError> {
        if self.supported.iter().any(|v| v == requested) {
            Ok(())
        } else {
            Err(ToolCallError::UnsupportedApiVersion {
                requested: format!("{requested} (supported: {})", self.supported.join(", ")),
            })
        }
    }
}
