//! Low-level key-value storage backend trait and supporting types.
//!
//! The [`StorageBackend`] trait defines the contract that all storage engines
//! implement: [`get`](StorageBackend::get), [`put`](StorageBackend::put),
//! [`put_with_condition`](StorageBackend::put_with_condition),
//! [`delete`](StorageBackend::delete), [`list_by_prefix`](StorageBackend::list_by_prefix),
//! and [`cleanup_expired`](StorageBackend::cleanup_expired).
//!
//! Domain logic (state machine validation, tenant isolation, idempotency-key
//! comparison, TTL enforcement, serialization) does **not** belong here.
//! Backends are dumb KV stores; domain logic lives in `GenericToolCallStore`.
//!
//! # Key structure
//!
//! Keys are composite strings in the format `{tenant}:{tool_name}:{id}`. A
//! colon separator is safe because none of the three components may contain
//! one (enforced by the domain store before a key is ever constructed).
//! Prefix queries use `{tenant}:` to scope listings to a tenant, or
//! `{tenant}:{tool_name}:` to scope to a single tool.
//!
//! # Versioning
//!
//! Each stored record carries an opaque etag string. Uniqueness across
//! writes is the only contract; etags MUST NOT be parsed or compared as
//! numbers by callers. [`put_with_condition`](StorageBackend::put_with_condition)
//! provides compare-and-swap semantics via [`PutCondition`].

use std::fmt;

use async_trait::async_trait;

/// The `*` sentinel for `If-None-Match`: "create iff absent".
pub const ETAG_ANY: &str = "etag-any";

/// A stored record paired with its current etag.
#[derive(Debug, Clone)]
pub struct VersionedRecord {
    /// The serialized ToolCall record bytes (canonical JSON).
    pub data: Vec<u8>,
    /// Opaque etag assigned on the last successful write.
    pub etag: String,
}

/// A write precondition for [`StorageBackend::put_with_condition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutCondition {
    /// Replace or create unconditionally.
    None,
    /// Replace iff the stored etag equals this value.
    IfMatch(String),
    /// Create iff no record currently exists (the `etag-any` sentinel).
    IfNoneMatchAny,
}

/// Errors that can occur during raw storage operations.
///
/// Low-level errors from the storage backend. `GenericToolCallStore` maps
/// them to [`crate::error::ToolCallError`] variants before surfacing to
/// callers; no backend-specific detail crosses that boundary.
#[derive(Debug)]
pub enum StorageError {
    /// The requested key was not found in storage.
    NotFound { key: String },

    /// A [`put_with_condition`](StorageBackend::put_with_condition) call
    /// failed because the stored etag did not satisfy the condition.
    PreconditionFailed {
        key: String,
        /// The etag currently stored, if the key exists.
        current_etag: Option<String>,
    },

    /// The backend has reached a capacity limit.
    CapacityExceeded { message: String },

    /// An I/O or backend-specific error occurred.
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { key } => write!(f, "key not found: {key}"),
            Self::PreconditionFailed { key, current_etag } => match current_etag {
                Some(etag) => write!(f, "precondition failed on key {key}: current etag {etag}"),
                None => write!(f, "precondition failed on key {key}: no current record"),
            },
            Self::CapacityExceeded { message } => write!(f, "capacity exceeded: {message}"),
            Self::Backend { message, .. } => write!(f, "backend error: {message}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend {
                source: Some(src), ..
            } => Some(src.as_ref()),
            _ => None,
        }
    }
}

/// Key-value storage backend for ToolCall persistence.
///
/// Implementations provide raw storage primitives only. All domain logic
/// lives in `GenericToolCallStore`, never in the backend.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Retrieves a record by key.
    ///
    /// # Errors
    /// [`StorageError::NotFound`] if no record exists; [`StorageError::Backend`]
    /// on I/O or backend-specific failures.
    async fn get(&self, key: &str) -> Result<VersionedRecord, StorageError>;

    /// Stores a record unconditionally (create or overwrite), returning the
    /// newly assigned etag.
    async fn put(&self, key: &str, data: &[u8]) -> Result<String, StorageError>;

    /// Stores a record subject to `condition`, returning the newly assigned
    /// etag on success.
    ///
    /// # Errors
    /// [`StorageError::PreconditionFailed`] if `condition` is not satisfied;
    /// [`StorageError::CapacityExceeded`]; [`StorageError::Backend`].
    async fn put_with_condition(
        &self,
        key: &str,
        data: &[u8],
        condition: PutCondition,
    ) -> Result<String, StorageError>;

    /// Deletes a record by key. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Lists all records whose key starts with `prefix`.
    async fn list_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, VersionedRecord)>, StorageError>;

    /// Removes records that have expired, using backend-specific criteria.
    /// Best-effort; expiry is also checked at read time. Returns the count
    /// of records removed.
    async fn cleanup_expired(&self) -> Result<usize, StorageError>;
}

/// Constructs a storage key from `(tenant, tool_name, id)`.
pub fn make_key(tenant: &str, tool_name: &str, id: &str) -> String {
    format!("{tenant}:{tool_name}:{id}")
}

/// Parses a storage key into its `(tenant, tool_name, id)` components.
/// Returns `None` if the key does not contain exactly two colons.
pub fn parse_key(key: &str) -> Option<(&str, &str, &str)> {
    let mut parts = key.splitn(3, ':');
    let tenant = parts.next()?;
    let tool_name = parts.next()?;
    let id = parts.next()?;
    Some((tenant, tool_name, id))
}

/// Constructs a prefix scoping a listing to a single tenant.
pub fn make_tenant_prefix(tenant: &str) -> String {
    format!("{tenant}:")
}

/// Constructs a prefix scoping a listing to a single tenant and tool.
pub fn make_tool_prefix(tenant: &str, tool_name: &str) -> String {
    format!("{tenant}:{tool_name}:")
}
