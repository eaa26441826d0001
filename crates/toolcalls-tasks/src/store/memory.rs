//! In-memory storage backend and ToolCall store.
//!
//! [`InMemoryBackend`] is a thread-safe [`StorageBackend`] built on
//! `DashMap<String, VersionedRecord>`. It is a dumb KV store with no
//! domain logic.
//!
//! [`InMemoryToolCallStore`] is a thin wrapper around
//! [`GenericToolCallStore<InMemoryBackend>`](crate::store::generic::GenericToolCallStore)
//! preserving a zero-argument `new()` constructor and builder methods.
//!
//! # Concurrency
//!
//! `DashMap` gives fine-grained shard-level locking; compare-and-swap is
//! performed by holding the shard's entry lock for the duration of the
//! condition check and write, so concurrent CAS attempts on the same key
//! never interleave.
//!
//! # Examples
//!
//! ```
//! use toolcalls_tasks::store::memory::InMemoryToolCallStore;
//! use toolcalls_tasks::store::StoreConfig;
//!
//! let store = InMemoryToolCallStore::new().with_config(StoreConfig::default());
//! ```

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::ToolCallRecord;
use crate::error::ToolCallError;
use crate::store::backend::{make_key, parse_key, PutCondition, StorageBackend, StorageError, VersionedRecord, ETAG_ANY};
use crate::store::generic::GenericToolCallStore;

use super::{AccessCondition, GetOutcome, StoreConfig, ToolCallStore};

/// Thread-safe in-memory storage backend using [`DashMap`].
///
/// Contains no domain logic; [`GenericToolCallStore`] owns state-machine
/// validation, tenant isolation, idempotency-key comparison, and TTL
/// enforcement.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: DashMap<String, VersionedRecord>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<VersionedRecord, StorageError> {
        self.data
            .get(key)
            .map(|entry| entry.clone())
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<String, StorageError> {
        let etag = crate::domain::record::fresh_etag();
        self.data.insert(
            key.to_string(),
            VersionedRecord {
                data: data.to_vec(),
                etag: etag.clone(),
            },
        );
        Ok(etag)
    }

    async fn put_with_condition(
        &self,
        key: &str,
        data: &[u8],
        condition: PutCondition,
    ) -> Result<String, StorageError> {
        use dashmap::mapref::entry::Entry;

        let new_etag = crate::domain::record::fresh_etag();
        match self.data.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => match &condition {
                PutCondition::IfNoneMatchAny => Err(StorageError::PreconditionFailed {
                    key: key.to_string(),
                    current_etag: Some(occupied.get().etag.clone()),
                }),
                PutCondition::IfMatch(expected) => {
                    if &occupied.get().etag == expected {
                        occupied.insert(VersionedRecord {
                            data: data.to_vec(),
                            etag: new_etag.clone(),
                        });
                        Ok(new_etag)
                    } else {
                        Err(StorageError::PreconditionFailed {
                            key: key.to_string(),
                            current_etag: Some(occupied.get().etag.clone()),
                        })
                    }
                }
                PutCondition::None => {
                    occupied.insert(VersionedRecord {
                        data: data.to_vec(),
                        etag: new_etag.clone(),
                    });
                    Ok(new_etag)
                }
            },
            Entry::Vacant(vacant) => match &condition {
                PutCondition::IfMatch(_) => Err(StorageError::PreconditionFailed {
                    key: key.to_string(),
                    current_etag: None,
                }),
                PutCondition::IfNoneMatchAny | PutCondition::None => {
                    vacant.insert(VersionedRecord {
                        data: data.to_vec(),
                        etag: new_etag.clone(),
                    });
                    Ok(new_etag)
                }
            },
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.data.remove(key).is_some())
    }

    async fn list_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, VersionedRecord)>, StorageError> {
        Ok(self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn cleanup_expired(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        let expired_keys: Vec<String> = self
            .data
            .iter()
            .filter_map(|entry| {
                let record: ToolCallRecord = serde_json::from_slice(&entry.value().data).ok()?;
                if record.is_expired() {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect();

        for key in expired_keys {
            if self.data.remove(&key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Thin, convenience wrapper around [`GenericToolCallStore<InMemoryBackend>`].
#[derive(Debug)]
pub struct InMemoryToolCallStore {
    inner: GenericToolCallStore<InMemoryBackend>,
}

impl InMemoryToolCallStore {
    pub fn new() -> Self {
        Self {
            inner: GenericToolCallStore::new(InMemoryBackend::new()),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.inner = self.inner.with_config(config);
        self
    }
}

impl Default for InMemoryToolCallStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolCallStore for InMemoryToolCallStore {
    async fn put(
        &self,
        record: ToolCallRecord,
        condition: AccessCondition,
    ) -> Result<ToolCallRecord, ToolCallError> {
        self.inner.put(record, condition).await
    }

    async fn get(
        &self,
        tenant: &str,
        tool_name: &str,
        id: &str,
        condition: AccessCondition,
    ) -> Result<GetOutcome, ToolCallError> {
        self.inner.get(tenant, tool_name, id, condition).await
    }

    async fn delete(
        &self,
        tenant: &str,
        tool_name: &str,
        id: &str,
        condition: AccessCondition,
    ) -> Result<(), ToolCallError> {
        self.inner.delete(tenant, tool_name, id, condition).await
    }

    async fn cleanup_expired(&self) -> Result<usize, ToolCallError> {
        self.inner.cleanup_expired().await
    }

    fn config(&self) -> &StoreConfig {
        self.inner.config()
    }
}
