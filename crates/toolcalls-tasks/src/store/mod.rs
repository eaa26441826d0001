//! ToolCall store trait, generic implementation, and supporting types.
//!
//! # Architecture
//!
//! 1. **[`ToolCallStore`]** -- the domain-facing trait used behind
//!    `Arc<dyn ToolCallStore>` by [`ToolCallContext`](crate::context::ToolCallContext)
//!    and the PhaseManager. Owns state-machine validation, tenant isolation,
//!    idempotency-key comparison, expiration enforcement, and canonical
//!    serialization.
//! 2. **[`GenericToolCallStore<B>`](generic::GenericToolCallStore)** -- the
//!    concrete implementation of all that domain logic over any
//!    [`StorageBackend`]. Has a blanket `ToolCallStore` impl.
//! 3. **[`StorageBackend`]** -- a dumb KV trait (in-memory today; other
//!    backends are named contracts only).
//!
//! To build a store: `GenericToolCallStore::new(backend)`, or use
//! [`memory::InMemoryToolCallStore`] directly.

pub mod backend;
pub mod generic;
pub mod memory;

use async_trait::async_trait;

pub use backend::{StorageBackend, StorageError, VersionedRecord, ETAG_ANY};

use crate::domain::ToolCallRecord;
use crate::error::ToolCallError;

/// Preconditions carried by a store write or read, mirroring the HTTP
/// `If-Match`/`If-None-Match` headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessCondition {
    /// Write succeeds only if the stored etag equals this value.
    pub if_match: Option<String>,
    /// On write, the [`ETAG_ANY`] sentinel means "create iff absent". On
    /// read, any other value means "return `NotModified` if it matches".
    pub if_none_match: Option<String>,
}

impl AccessCondition {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn if_match(etag: impl Into<String>) -> Self {
        Self {
            if_match: Some(etag.into()),
            if_none_match: None,
        }
    }

    pub fn create_only() -> Self {
        Self {
            if_match: None,
            if_none_match: Some(ETAG_ANY.to_string()),
        }
    }
}

/// Outcome of a conditional [`ToolCallStore::get`].
#[derive(Debug, Clone)]
pub enum GetOutcome {
    Found(ToolCallRecord),
    /// `If-None-Match` matched the current etag; the caller should return
    /// an empty 304 response.
    NotModified { etag: String },
}

/// Configuration for request body limits and TTL enforcement.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum allowed size, in bytes, for an opaque `request`/`internal` body.
    pub max_body_bytes: usize,
    /// Default TTL applied when a client does not request one.
    pub default_ttl_secs: i64,
    /// Maximum TTL a client may request.
    pub max_ttl_secs: i64,
    /// Maximum JSON nesting depth for opaque bodies.
    pub max_body_depth: usize,
    /// Maximum byte length for any string value within an opaque body.
    pub max_string_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1_048_576,
            default_ttl_secs: 24 * 60 * 60,
            max_ttl_secs: 7 * 24 * 60 * 60,
            max_body_depth: 10,
            max_string_length: 65_536,
        }
    }
}

/// The domain-facing ToolCall store.
///
/// Implementations own state-machine validation, tenant isolation,
/// idempotency-key comparison, expiration enforcement, and canonical
/// serialization; [`StorageBackend`] implementations must not.
#[async_trait]
pub trait ToolCallStore: Send + Sync {
    /// Writes `record` subject to `condition`.
    ///
    /// When `condition` is [`AccessCondition::create_only`] and a record
    /// already exists at `(tenant, toolName, id)`, this compares
    /// `idempotencyKey`: a match returns the existing record unchanged
    /// (idempotent retry); a mismatch is [`ToolCallError::IdempotencyKeyConflict`].
    ///
    /// When `condition.if_match` is set, the prior status's transition to
    /// `record.status` is validated before the write is attempted.
    async fn put(
        &self,
        record: ToolCallRecord,
        condition: AccessCondition,
    ) -> Result<ToolCallRecord, ToolCallError>;

    /// Reads the record at `(tenant, tool_name, id)`, subject to `condition`.
    async fn get(
        &self,
        tenant: &str,
        tool_name: &str,
        id: &str,
        condition: AccessCondition,
    ) -> Result<GetOutcome, ToolCallError>;

    /// Deletes the record at `(tenant, tool_name, id)`, subject to `condition`.
    async fn delete(
        &self,
        tenant: &str,
        tool_name: &str,
        id: &str,
        condition: AccessCondition,
    ) -> Result<(), ToolCallError>;

    /// Scans for and deletes records past their `expiration`. Best-effort;
    /// returns the number removed.
    async fn cleanup_expired(&self) -> Result<usize, ToolCallError>;

    /// The configured limits this store enforces.
    fn config(&self) -> &StoreConfig;
}
