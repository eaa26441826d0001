//! `count` -- autonomous, multi-phase reference tool.
//!
//! `Create` reads `{countto}`, seeds `internal` with a counter starting at
//! 0, sets `phase="counting"` and `status=running`, and starts phase
//! processing. Each `ProcessPhase` step increments the counter by one,
//! mirrors it into `progress`, and -- while below `countto` -- leaves
//! `status=running` so the PhaseManager re-enqueues it; on reaching
//! `countto` it sets `result={count}` and completes.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ToolCallContext;
use crate::domain::ToolCallRecord;
use crate::error::ToolCallError;
use crate::handler::{ToolHandler, ToolMetadata};
use crate::phase::PhaseManager;
use crate::types::status::Status;

pub struct CountHandler;

#[async_trait]
impl ToolHandler for CountHandler {
    fn tool(&self) -> ToolMetadata {
        ToolMetadata {
            name: "count".to_string(),
            title: Some("Count".to_string()),
            description: Some("Counts up to a target value across autonomous phase steps.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {"countto": {"type": "integer"}},
                "required": ["countto"],
            }),
            output_schema: Some(json!({
                "type": "object",
                "properties": {"count": {"type": "integer"}},
            })),
            annotations: None,
        }
    }

    async fn create(
        &self,
        _ctx: &ToolCallContext,
        record: &mut ToolCallRecord,
        request: Option<Value>,
        phase_manager: &PhaseManager,
    ) -> Result<(), ToolCallError> {
        let body = request.ok_or_else(|| ToolCallError::BadRequest {
            detail: "count requires a request body".to_string(),
        })?;
        let countto = body
            .get("countto")
            .and_then(Value::as_i64)
            .ok_or_else(|| ToolCallError::BadRequest {
                detail: "count requires integer field \"countto\"".to_string(),
            })?;

        record.request = Some(body);
        record.internal = Some(json!({"counter": 0}));
        record.phase = Some("counting".to_string());
        record.progress = Some(json!(0));
        record.status = Status::Running;

        phase_manager.start_phase(record.tenant.clone(), record.tool_name.clone(), record.id.clone());
        Ok(())
    }

    async fn process_phase(
        &self,
        _ctx: &ToolCallContext,
        _phase_manager: &PhaseManager,
        record: &mut ToolCallRecord,
    ) -> Result<(), ToolCallError> {
        let countto = record
            .request
            .as_ref()
            .and_then(|v| v.get("countto"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let counter = record
            .internal
            .as_ref()
            .and_then(|v| v.get("counter"))
            .and_then(Value::as_i64)
            .unwrap_or(0)
            + 1;

        record.internal = Some(json!({"counter": counter}));
        record.progress = Some(json!(counter));

        if counter >= countto {
            record.phase = None;
            record.result = Some(json!({"count": counter}));
            record.status = Status::Success;
        }
        Ok(())
    }
}
