//! Generic domain-logic store, parameterized over any [`StorageBackend`].
//!
//! [`GenericToolCallStore`] implements every rule named in the store
//! component's contract: state-machine validation, tenant partitioning,
//! idempotency-key comparison, expiration, and canonical serialization.
//! It performs a single CAS attempt per call and surfaces a conflict
//! directly to the caller rather than retrying internally -- the loser
//! of a race observes `PreconditionFailed`, per the store's concurrency
//! contract.

use async_trait::async_trait;

use crate::domain::ToolCallRecord;
use crate::error::ToolCallError;
use crate::store::backend::{make_key, make_tenant_prefix, PutCondition, StorageBackend, StorageError};
use crate::store::{AccessCondition, GetOutcome, StoreConfig, ToolCallStore, ETAG_ANY};

/// Domain store wrapping a dumb [`StorageBackend`].
#[derive(Debug)]
pub struct GenericToolCallStore<B: StorageBackend> {
    backend: B,
    config: StoreConfig,
}

impl<B: StorageBackend> GenericToolCallStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: StoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn key(tenant: &str, tool_name: &str, id: &str) -> String {
        make_key(tenant, tool_name, id)
    }

    fn decode(data: &[u8]) -> Result<ToolCallRecord, ToolCallError> {
        serde_json::from_slice(data)
            .map_err(|e| ToolCallError::Store(format!("corrupt record: {e}")))
    }

    fn encode(record: &ToolCallRecord) -> Result<Vec<u8>, ToolCallError> {
        serde_json::to_vec(record).map_err(|e| ToolCallError::Store(format!("encode failure: {e}")))
    }
}

fn map_storage_error(err: StorageError, tool_call_id: &str) -> ToolCallError {
    match err {
        StorageError::NotFound { .. } => ToolCallError::NotFound {
            tool_call_id: tool_call_id.to_string(),
        },
        StorageError::PreconditionFailed { current_etag, .. } => ToolCallError::PreconditionFailed {
            tool_call_id: tool_call_id.to_string(),
            expected: String::new(),
            actual: current_etag.unwrap_or_default(),
        },
        StorageError::CapacityExceeded { message } | StorageError::Backend { message, .. } => {
            ToolCallError::Store(message)
        }
    }
}

#[async_trait]
impl<B: StorageBackend> ToolCallStore for GenericToolCallStore<B> {
    async fn put(
        &self,
        mut record: ToolCallRecord,
        condition: AccessCondition,
    ) -> Result<ToolCallRecord, ToolCallError> {
        let key = Self::key(&record.tenant, &record.tool_name, &record.id);

        if let Some(body) = &record.request {
            crate::domain::record::validate_json_depth(body, self.config.max_body_depth)
                .map_err(|detail| ToolCallError::BadRequest { detail })?;
            crate::domain::record::validate_json_string_lengths(body, self.config.max_string_length)
                .map_err(|detail| ToolCallError::BadRequest { detail })?;
        }

        match condition.if_none_match.as_deref() {
            Some(ETAG_ANY) => {
                record.touch();
                let data = Self::encode(&record)?;
                match self
                    .backend
                    .put_with_condition(&key, &data, PutCondition::IfNoneMatchAny)
                    .await
                {
                    Ok(_) => Ok(record),
                    Err(StorageError::PreconditionFailed { .. }) => {
                        let existing = self
                            .backend
                            .get(&key)
                            .await
                            .map_err(|e| map_storage_error(e, &record.id))?;
                        let existing_record = Self::decode(&existing.data)?;
                        if existing_record.idempotency_key.is_some()
                            && existing_record.idempotency_key == record.idempotency_key
                        {
                            Ok(existing_record)
                        } else {
                            Err(ToolCallError::IdempotencyKeyConflict {
                                tool_call_id: record.id.clone(),
                            })
                        }
                    }
                    Err(e) => Err(map_storage_error(e, &record.id)),
                }
            }
            Some(other) => Err(ToolCallError::BadRequest {
                detail: format!("unsupported If-None-Match value on write: {other}"),
            }),
            None => {
                let existing = self.backend.get(&key).await;
                let storage_condition = match &condition.if_match {
                    Some(etag) => PutCondition::IfMatch(etag.clone()),
                    None => PutCondition::None,
                };

                if condition.if_match.is_some() {
                    if let Ok(existing) = &existing {
                        let current = Self::decode(&existing.data)?;
                        current.status.validate_transition(&record.id, &record.status)?;
                    }
                }

                record.touch();
                let data = Self::encode(&record)?;
                match self.backend.put_with_condition(&key, &data, storage_condition).await {
                    Ok(_) => Ok(record),
                    Err(StorageError::PreconditionFailed { current_etag, .. }) => {
                        Err(ToolCallError::PreconditionFailed {
                            tool_call_id: record.id.clone(),
                            expected: condition.if_match.unwrap_or_default(),
                            actual: current_etag.unwrap_or_default(),
                        })
                    }
                    Err(e) => Err(map_storage_error(e, &record.id)),
                }
            }
        }
    }

    async fn get(
        &self,
        tenant: &str,
        tool_name: &str,
        id: &str,
        condition: AccessCondition,
    ) -> Result<GetOutcome, ToolCallError> {
        let key = Self::key(tenant, tool_name, id);
        let versioned = self
            .backend
            .get(&key)
            .await
            .map_err(|e| map_storage_error(e, id))?;

        if let Some(expected) = &condition.if_none_match {
            if expected == &versioned.etag {
                return Ok(GetOutcome::NotModified {
                    etag: versioned.etag,
                });
            }
        }

        let record = Self::decode(&versioned.data)?;
        Ok(GetOutcome::Found(record))
    }

    async fn delete(
        &self,
        tenant: &str,
        tool_name: &str,
        id: &str,
        condition: AccessCondition,
    ) -> Result<(), ToolCallError> {
        let key = Self::key(tenant, tool_name, id);

        if let Some(expected) = &condition.if_match {
            let versioned = self.backend.get(&key).await.map_err(|e| map_storage_error(e, id))?;
            if &versioned.etag != expected {
                return Err(ToolCallError::PreconditionFailed {
                    tool_call_id: id.to_string(),
                    expected: expected.clone(),
                    actual: versioned.etag,
                });
            }
        }

        self.backend.delete(&key).await.map_err(|e| map_storage_error(e, id))?;
        Ok(())
    }

    async fn cleanup_expired(&self) -> Result<usize, ToolCallError> {
        self.backend
            .cleanup_expired()
            .await
            .map_err(|e| map_storage_error(e, ""))
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}

/// Lists all records for a tenant. Not part of [`ToolCallStore`] (the core
/// contract names only Put/Get/Delete); used by the expiration reaper and
/// admin tooling that needs to enumerate a tenant's ToolCalls.
pub async fn list_tenant_records<B: StorageBackend>(
    store: &GenericToolCallStore<B>,
    tenant: &str,
) -> Result<Vec<ToolCallRecord>, ToolCallError> {
    let prefix = make_tenant_prefix(tenant);
    let entries = store
        .backend
        .list_by_prefix(&prefix)
        .await
        .map_err(|e| map_storage_error(e, ""))?;
    entries
        .into_iter()
        .map(|(_, versioned)| GenericToolCallStore::<B>::decode(&versioned.data))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryBackend;
    use crate::types::status::Status;
    use serde_json::json;

    fn make_record(tenant: &str, tool: &str, id: &str) -> ToolCallRecord {
        ToolCallRecord::new(
            tenant.to_string(),
            tool.to_string(),
            id.to_string(),
            Some(json!({"x": 1})),
            Some("idem-1".to_string()),
            None,
        )
    }

    fn store() -> GenericToolCallStore<InMemoryBackend> {
        GenericToolCallStore::new(InMemoryBackend::new())
    }

    #[tokio::test]
    async fn put_create_only_succeeds_when_absent() {
        let s = store();
        let record = make_record("t1", "add", "id-1");
        let created = s.put(record, AccessCondition::create_only()).await.unwrap();
        assert_eq!(created.status, Status::Submitted);
    }

    #[tokio::test]
    async fn put_create_only_retry_with_same_idempotency_key_returns_existing() {
        let s = store();
        let record = make_record("t1", "add", "id-1");
        let first = s.put(record.clone(), AccessCondition::create_only()).await.unwrap();
        let second = s.put(record, AccessCondition::create_only()).await.unwrap();
        assert_eq!(first.etag, second.etag);
    }

    #[tokio::test]
    async fn put_create_only_different_idempotency_key_is_conflict() {
        let s = store();
        let mut record = make_record("t1", "add", "id-1");
        s.put(record.clone(), AccessCondition::create_only()).await.unwrap();
        record.idempotency_key = Some("different".to_string());
        let result = s.put(record, AccessCondition::create_only()).await;
        assert!(matches!(result, Err(ToolCallError::IdempotencyKeyConflict { .. })));
    }

    #[tokio::test]
    async fn put_if_match_succeeds_on_matching_etag() {
        let s = store();
        let record = make_record("t1", "add", "id-1");
        let created = s.put(record, AccessCondition::create_only()).await.unwrap();

        let mut next = created.clone();
        next.status = Status::Success;
        next.result = Some(json!({"sum": 8}));
        let updated = s
            .put(next, AccessCondition::if_match(created.etag.clone()))
            .await
            .unwrap();
        assert_ne!(updated.etag, created.etag);
        assert_eq!(updated.status, Status::Success);
    }

    #[tokio::test]
    async fn put_if_match_fails_on_stale_etag() {
        let s = store();
        let record = make_record("t1", "add", "id-1");
        let created = s.put(record, AccessCondition::create_only()).await.unwrap();

        let mut next = created.clone();
        next.status = Status::Success;
        let result = s.put(next, AccessCondition::if_match("stale-etag")).await;
        assert!(matches!(result, Err(ToolCallError::PreconditionFailed { .. })));
    }

    #[tokio::test]
    async fn put_if_match_rejects_invalid_transition() {
        let s = store();
        let record = make_record("t1", "add", "id-1");
        let created = s.put(record, AccessCondition::create_only()).await.unwrap();

        let mut terminal = created.clone();
        terminal.status = Status::Success;
        let terminal = s
            .put(terminal, AccessCondition::if_match(created.etag.clone()))
            .await
            .unwrap();

        let mut reopened = terminal.clone();
        reopened.status = Status::Running;
        let result = s.put(reopened, AccessCondition::if_match(terminal.etag.clone())).await;
        assert!(matches!(result, Err(ToolCallError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn get_returns_not_modified_on_matching_etag() {
        let s = store();
        let record = make_record("t1", "add", "id-1");
        let created = s.put(record, AccessCondition::create_only()).await.unwrap();

        let outcome = s
            .get(
                "t1",
                "add",
                "id-1",
                AccessCondition {
                    if_match: None,
                    if_none_match: Some(created.etag.clone()),
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, GetOutcome::NotModified { .. }));
    }

    #[tokio::test]
    async fn get_returns_found_on_mismatched_etag() {
        let s = store();
        let record = make_record("t1", "add", "id-1");
        s.put(record, AccessCondition::create_only()).await.unwrap();

        let outcome = s
            .get(
                "t1",
                "add",
                "id-1",
                AccessCondition {
                    if_match: None,
                    if_none_match: Some("different".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, GetOutcome::Found(_)));
    }

    #[tokio::test]
    async fn get_unknown_tenant_is_not_found() {
        let s = store();
        let record = make_record("t1", "add", "id-1");
        s.put(record, AccessCondition::create_only()).await.unwrap();

        let result = s.get("t2", "add", "id-1", AccessCondition::none()).await;
        assert!(matches!(result, Err(ToolCallError::NotFound { .. })));
    }

    #[tokio::test]
    async fn tenants_are_isolated() {
        let s = store();
        s.put(make_record("t1", "add", "shared-id"), AccessCondition::create_only())
            .await
            .unwrap();
        s.put(make_record("t2", "add", "shared-id"), AccessCondition::create_only())
            .await
            .unwrap();

        let r1 = s.get("t1", "add", "shared-id", AccessCondition::none()).await.unwrap();
        let r2 = s.get("t2", "add", "shared-id", AccessCondition::none()).await.unwrap();
        match (r1, r2) {
            (GetOutcome::Found(a), GetOutcome::Found(b)) => {
                assert_eq!(a.tenant, "t1");
                assert_eq!(b.tenant, "t2");
            }
            _ => panic!("expected both found"),
        }
    }

    #[tokio::test]
    async fn delete_with_if_match_succeeds() {
        let s = store();
        let created = s
            .put(make_record("t1", "add", "id-1"), AccessCondition::create_only())
            .await
            .unwrap();
        s.delete("t1", "add", "id-1", AccessCondition::if_match(created.etag))
            .await
            .unwrap();
        let result = s.get("t1", "add", "id-1", AccessCondition::none()).await;
        assert!(matches!(result, Err(ToolCallError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_with_stale_if_match_fails() {
        let s = store();
        s.put(make_record("t1", "add", "id-1"), AccessCondition::create_only())
            .await
            .unwrap();
        let result = s
            .delete("t1", "add", "id-1", AccessCondition::if_match("stale"))
            .await;
        assert!(matches!(result, Err(ToolCallError::PreconditionFailed { .. })));
    }

    #[tokio::test]
    async fn cleanup_expired_removes_past_expiration() {
        let s = store();
        let mut record = make_record("t1", "add", "id-1");
        record.expiration = chrono::Utc::now() - chrono::Duration::seconds(10);
        s.put(record, AccessCondition::create_only()).await.unwrap();
        let removed = s.cleanup_expired().await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn list_tenant_records_scopes_by_tenant() {
        let s = store();
        s.put(make_record("t1", "add", "a"), AccessCondition::create_only())
            .await
            .unwrap();
        s.put(make_record("t1", "add", "b"), AccessCondition::create_only())
            .await
            .unwrap();
        s.put(make_record("t2", "add", "c"), AccessCondition::create_only())
            .await
            .unwrap();

        let records = list_tenant_records(&s, "t1").await.unwrap();
        assert_eq!(records.len(), 2);
    }
}
