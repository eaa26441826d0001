//! `pii` -- elicitation-gated reference tool.
//!
//! `Create` parks the ToolCall in `awaitingElicitationResult`, asking the
//! client to approve handling of a named key. `Advance` inspects the
//! client's disposition: `accept` synthesizes a non-empty payload and
//! completes; `decline` cancels with no result.

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

pub struct PiiHandler;

#[async_trait]
impl ToolHandler for PiiHandler {
    fn tool(&self) -> ToolMetadata {
        ToolMetadata {
            name: "pii".to_string(),
            title: Some("PII Lookup".to_string()),
            description: Some("Looks up a named PII key after explicit client approval.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {"key": {"type": "string"}},
                "required": ["key"],
            }),
            output_schema: None,
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
            "approved".to_string(),
            PrimitiveSchemaDefinition::Boolean {
                title: Some("Approve PII access".to_string()),
                description: None,
            },
        );
        record.elicitation_request = Some(ElicitationRequest {
            message: "This tool requires access to a named PII field. Approve?".to_string(),
            requested_schema: ElicitationSchema {
                properties,
                required: vec!["approved".to_string()],
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
                record.elicitation_request = None;
                record.result = Some(json!({"data": "synthesized-non-empty-pii-payload"}));
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
