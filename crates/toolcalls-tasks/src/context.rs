//! Ergonomic wrapper for ToolCall operations in tool handlers.
//!
//! [`ToolCallContext`] scopes all store operations to a single ToolCall,
//! hiding the `(tenant, toolName, id)` key and the store reference from
//! handler code. Handlers mutate the [`ToolCallRecord`] they are given
//! directly; `ToolCallContext` exists for the handful of operations a
//! handler needs against the store itself (re-fetching, persisting a
//! mutated record with the right precondition, starting phase processing).
//!
//! # Design
//!
//! `ToolCallContext` is `Clone + Send + Sync`: it wraps an
//! `Arc<dyn ToolCallStore>` and three `String` fields. Cloning is cheap.

use std::sync::Arc;

use crate::domain::ToolCallRecord;
use crate::error::ToolCallError;
use crate::store::{AccessCondition, GetOutcome, ToolCallStore};

/// Ergonomic wrapper that scopes all operations to a single ToolCall.
#[derive(Clone)]
pub struct ToolCallContext {
    store: Arc<dyn ToolCallStore>,
    tenant: String,
    tool_name: String,
    id: String,
}

impl ToolCallContext {
    pub fn new(store: Arc<dyn ToolCallStore>, tenant: String, tool_name: String, id: String) -> Self {
        Self {
            store,
            tenant,
            tool_name,
            id,
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetches the current record unconditionally.
    pub async fn get(&self) -> Result<ToolCallRecord, ToolCallError> {
        match self
            .store
            .get(&self.tenant, &self.tool_name, &self.id, AccessCondition::none())
            .await?
        {
            GetOutcome::Found(record) => Ok(record),
            GetOutcome::NotModified { .. } => unreachable!("unconditional get never returns NotModified"),
        }
    }

    /// Persists `record`, requiring the stored ETag to equal `record.etag`
    /// (the precondition every non-create write in the handler contract uses).
    pub async fn persist(&self, record: ToolCallRecord) -> Result<ToolCallRecord, ToolCallError> {
        let condition = AccessCondition::if_match(record.etag.clone());
        self.store.put(record, condition).await
    }

    /// Persists `record` as a brand-new ToolCall (`IfNoneMatch=etag-any`).
    pub async fn create(&self, record: ToolCallRecord) -> Result<ToolCallRecord, ToolCallError> {
        self.store.put(record, AccessCondition::create_only()).await
    }
}

impl std::fmt::Debug for ToolCallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCallContext")
            .field("tenant", &self.tenant)
            .field("tool_name", &self.tool_name)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryToolCallStore;
    use crate::types::status::Status;
    use serde_json::json;

    fn ctx(store: Arc<dyn ToolCallStore>, id: &str) -> ToolCallContext {
        ToolCallContext::new(store, "t1".to_string(), "add".to_string(), id.to_string())
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store: Arc<dyn ToolCallStore> = Arc::new(InMemoryToolCallStore::new());
        let context = ctx(store, "id-1");
        let record = ToolCallRecord::new(
            "t1".to_string(),
            "add".to_string(),
            "id-1".to_string(),
            Some(json!({"x": 1, "y": 2})),
            Some("k1".to_string()),
            None,
        );
        context.create(record).await.unwrap();
        let fetched = context.get().await.unwrap();
        assert_eq!(fetched.id, "id-1");
    }

    #[tokio::test]
    async fn persist_requires_matching_etag() {
        let store: Arc<dyn ToolCallStore> = Arc::new(InMemoryToolCallStore::new());
        let context = ctx(store, "id-1");
        let record = ToolCallRecord::new(
            "t1".to_string(),
            "add".to_string(),
            "id-1".to_string(),
            None,
            Some("k1".to_string()),
            None,
        );
        let created = context.create(record).await.unwrap();

        let mut next = created.clone();
        next.status = Status::Success;
        let updated = context.persist(next).await.unwrap();
        assert_eq!(updated.status, Status::Success);
    }
}
