//! Per-tool handler contract and registry.
//!
//! Each tool registers a [`ToolHandler`] implementing the verbs it supports.
//! [`DefaultToolHandler`]-style behavior (reject with `NotAllowed`) is the
//! default for every method a concrete handler does not override, so a tool
//! can opt into only the operations it needs.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ToolCallContext;
use crate::domain::ToolCallRecord;
use crate::error::ToolCallError;
use crate::phase::PhaseManager;
use crate::types::toolcall::AdvanceRequest;

/// Metadata describing a registered tool, returned by `GET /mcp/tools`.
#[derive(Debug, Clone)]
pub struct ToolMetadata {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub input_schema: Value,
    pub output_schema: Option<Value>,
    pub annotations: Option<Value>,
}

/// The per-tool handler contract.
///
/// Every method has a default that rejects with [`ToolCallError::NotAllowed`]
/// (`create`/`advance`) or is a harmless no-op (`get`/`cancel`/`process_phase`),
/// so a tool need only override the verbs it actually supports.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Metadata surfaced by `GET /mcp/tools`.
    fn tool(&self) -> ToolMetadata;

    /// Runs on the initial PUT, when no record previously existed.
    ///
    /// Implementations parse `request`, set `record.status` (and possibly
    /// `samplingRequest`/`elicitationRequest`/`result`/`error`), and call
    /// `phase_manager.start_phase(..)` if autonomous processing is needed.
    /// The caller persists `record` with `IfNoneMatch=etag-any` afterward.
    async fn create(
        &self,
        _ctx: &ToolCallContext,
        record: &mut ToolCallRecord,
        _request: Option<Value>,
        _phase_manager: &PhaseManager,
    ) -> Result<(), ToolCallError> {
        Err(ToolCallError::NotAllowed {
            tool_call_id: record.id.clone(),
            detail: "tool does not support create".to_string(),
        })
    }

    /// Called before the current projected record is written to the client.
    /// Most tools have nothing to add here.
    async fn get(&self, _ctx: &ToolCallContext, _record: &ToolCallRecord) -> Result<(), ToolCallError> {
        Ok(())
    }

    /// Runs on `POST .../advance`. The caller has already validated that
    /// `record.status` is in the awaiting class; implementations parse
    /// `request` and mutate `record` accordingly. The caller persists
    /// `record` with `IfMatch=record.etag` afterward.
    async fn advance(
        &self,
        _ctx: &ToolCallContext,
        record: &mut ToolCallRecord,
        _request: AdvanceRequest,
    ) -> Result<(), ToolCallError> {
        Err(ToolCallError::NotAllowed {
            tool_call_id: record.id.clone(),
            detail: "tool does not support advance".to_string(),
        })
    }

    /// Runs on `POST .../cancel`. The caller has already checked for the
    /// terminal no-op case; implementations may clear tool-specific state
    /// beyond the generic `phase`/`error`/`result`/`*Request` fields the
    /// caller clears unconditionally.
    async fn cancel(&self, _ctx: &ToolCallContext, _record: &mut ToolCallRecord) -> Result<(), ToolCallError> {
        Ok(())
    }

    /// Invoked by the PhaseManager while `record.status` is in the
    /// processing class. Implementations mutate `record` in place
    /// (typically `phase` and/or `status`) and return; the PhaseManager
    /// persists the result with `IfMatch=record.etag`.
    async fn process_phase(
        &self,
        _ctx: &ToolCallContext,
        _phase_manager: &PhaseManager,
        _record: &mut ToolCallRecord,
    ) -> Result<(), ToolCallError> {
        Ok(())
    }
}

/// Registry of tool handlers keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: std::collections::HashMap<String, std::sync::Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: std::sync::Arc<dyn ToolHandler>) {
        let name = handler.tool().name.clone();
        self.handlers.insert(name, handler);
    }

    pub fn get(&self, name: &str) -> Option<std::sync::Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn list(&self) -> Vec<ToolMetadata> {
        self.handlers.values().map(|h| h.tool()).collect()
    }
}
