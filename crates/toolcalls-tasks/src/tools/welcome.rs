//! `welcome` -- elicitation with structured input.
//!
//! `Create` ignores its body and requests a `name` from the client.
//! `Advance` with `action=accept` and `content.name` completes with a
//! greeting; `decline` cancels.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ToolCallContext;
use crate::domain::ToolCallRecord;
use crate::error::ToolCallError;
use crate::handler::{ToolHandler, ToolMetadata};
use crate::phase::PhaseManager;
use crate::types::status::Status;
use crate::types::toolcall::{AdvanceAction, AdvanceRequest, ElicitationRequest, ElicitationSchema, PrimitiveSchemaDefinition};

pub struct WelcomeHandler;

#[async_trait]
impl ToolHandler for WelcomeHandler {
    fn tool(&self) -> ToolMetadata {
        ToolMetadata {
            name: "welcome".to_string(),
            title: Some("Welcome".to_string()),
            description: Some("Greets the caller by name, collected via elicitation.".to_string()),
            input_schema: json!({"type": "object"}),
            output_schema: Some(json!({
                "type": "object",
                "properties": {"welcome": {"type": "string"}},
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
        record.request = request;
        let mut properties = BTreeMap::new();
        properties.insert(
            "name".to_string(),
            PrimitiveSchemaDefinition::String {
                title: Some("Your name".to_string()),
                description: None,
            },
        );
        record.elicitation_request = Some(ElicitationRequest {
            message: "What name should I greet you with?".to_string(),
            requested_schema: ElicitationSchema {
                properties,
                required: vec!["name".to_string()],
            },
        });
        record.status = Status::AwaitingElicitationResult;
        Ok(())
    }

    async fn advance(
        &self,
        _ctx: &ToolCallContext,
        record: &mut ToolCallRecord,
        request: AdvanceRequest,
    ) -> Result<(), ToolCallError> {
        match request.action {
            AdvanceAction::Accept => {
                let name = request
                    .content
                    .as_ref()
                    .and_then(|c| c.get("name"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolCallError::BadRequest {
                        detail: "accept requires content.name".to_string(),
                    })?
                    .to_string();
                record.elicitation_request = None;
                record.result = Some(json!({"welcome": format!("Hello {name}")}));
                record.status = Status::Success;
            }
            AdvanceAction::Decline => {
                record.elicitation_request = None;
                record.status = Status::Canceled;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ToolRegistry;
    use crate::store::memory::InMemoryToolCallStore;
    use std::sync::Arc;

    fn context_and_manager() -> (ToolCallContext, PhaseManager) {
        let store: Arc<dyn crate::store::ToolCallStore> = Arc::new(InMemoryToolCallStore::new());
        let ctx = ToolCallContext::new(store.clone(), "t1".to_string(), "welcome".to_string(), "id-1".to_string());
        let manager = PhaseManager::new(store, Arc::new(ToolRegistry::new()));
        (ctx, manager)
    }

    #[tokio::test]
    async fn advance_accept_with_name_greets() {
        let (ctx, manager) = context_and_manager();
        let mut record = ToolCallRecord::new(
            "t1".to_string(),
            "welcome".to_string(),
            "id-1".to_string(),
            None,
            Some("k1".to_string()),
            None,
        );
        WelcomeHandler.create(&ctx, &mut record, None, &manager).await.unwrap();

        let advance = AdvanceRequest {
            action: AdvanceAction::Accept,
            content: Some(json!({"name": "Ada"})),
        };
        WelcomeHandler.advance(&ctx, &mut record, advance).await.unwrap();
        assert_eq!(record.status, Status::Success);
        assert_eq!(record.result, Some(json!({"welcome": "Hello Ada"})));
    }

    #[tokio::test]
    async fn advance_accept_without_name_is_bad_request() {
        let (ctx, manager) = context_and_manager();
        let mut record = ToolCallRecord::new(
            "t1".to_string(),
            "welcome".to_string(),
            "id-1".to_string(),
            None,
            Some("k1".to_string()),
            None,
        );
        WelcomeHandler.create(&ctx, &mut record, None, &manager).await.unwrap();

        let advance = AdvanceRequest {
            action: AdvanceAction::Accept,
            content: None,
        };
        let result = WelcomeHandler.advance(&ctx, &mut record, advance).await;
        assert!(matches!(result, Err(ToolCallError::BadRequest { .. })));
    }
}
