//! `add` -- a fully synchronous reference tool.
//!
//! `Create` reads `{x, y}` from the request body, sets `result = {sum}`,
//! and completes immediately. No phase processing, no elicitation.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ToolCallContext;
use crate::domain::ToolCallRecord;
use crate::error::ToolCallError;
use crate::handler::{ToolHandler, ToolMetadata};
use crate::phase::PhaseManager;
use crate::types::status::Status;

pub struct AddHandler;

#[async_trait]
impl ToolHandler for AddHandler {
    fn tool(&self) -> ToolMetadata {
        ToolMetadata {
            name: "add".to_string(),
            title: Some("Add".to_string()),
            description: Some("Adds two numbers and returns their sum.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "x": {"type": "number"},
                    "y": {"type": "number"},
                },
                "required": ["x", "y"],
            }),
            output_schema: Some(json!({
                "type": "object",
                "properties": {"sum": {"type": "number"}},
            })),
            annotations: None,
        }
    }

    async fn create(
        &self,
        _ctx: &ToolCallContext,
        record: &mut ToolCallRecord,
        request: Option<Value>,
        _phase_manager: &PhaseManager,
    ) -> Result<(), ToolCallError> {
        let body = request.ok_or_else(|| ToolCallError::BadRequest {
            detail: "add requires a request body".to_string(),
        })?;
        let x = body
            .get("x")
            .and_then(Value::as_f64)
            .ok_or_else(|| ToolCallError::BadRequest {
                detail: "add requires numeric field \"x\"".to_string(),
            })?;
        let y = body
            .get("y")
            .and_then(Value::as_f64)
            .ok_or_else(|| ToolCallError::BadRequest {
                detail: "add requires numeric field \"y\"".to_string(),
            })?;

        record.request = Some(body);
        record.result = Some(json!({"sum": x + y}));
        record.status = Status::Success;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryToolCallStore;
    use crate::handler::ToolRegistry;
    use std::sync::Arc;

    fn context_and_manager() -> (ToolCallContext, PhaseManager) {
        let store: Arc<dyn crate::store::ToolCallStore> = Arc::new(InMemoryToolCallStore::new());
        let ctx = ToolCallContext::new(store.clone(), "t1".to_string(), "add".to_string(), "id-1".to_string());
        let manager = PhaseManager::new(store, Arc::new(ToolRegistry::new()));
        (ctx, manager)
    }

    #[tokio::test]
    async fn create_computes_sum_and_completes() {
        let (ctx, manager) = context_and_manager();
        let mut record = ToolCallRecord::new(
            "t1".to_string(),
            "add".to_string(),
            "id-1".to_string(),
            None,
            Some("k1".to_string()),
            None,
        );
        AddHandler
            .create(&ctx, &mut record, Some(json!({"x": 2, "y": 3})), &manager)
            .await
            .unwrap();
        assert_eq!(record.status, Status::Success);
        assert_eq!(record.result, Some(json!({"sum": 5.0})));
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let (ctx, manager) = context_and_manager();
        let mut record = ToolCallRecord::new(
            "t1".to_string(),
            "add".to_string(),
            "id-1".to_string(),
            None,
            Some("k1".to_string()),
            None,
        );
        let result = AddHandler
            .create(&ctx, &mut record, Some(json!({"x": 2})), &manager)
            .await;
        assert!(matches!(result, Err(ToolCallError::BadRequest { .. })));
    }
}
