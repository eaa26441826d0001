//! HTTP orchestration (§4.5): the PUT/GET/advance/cancel stages plus the
//! `/mcp/tools` listing and the liveness probe.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use toolcalls_tasks::domain::ToolCallRecord;
use toolcalls_tasks::store::{AccessCondition, GetOutcome};
use toolcalls_tasks::types::toolcall::{AdvanceRequest, ProjectedToolCall};
use toolcalls_tasks::{Status, ToolCallError};

use crate::http::error::ApiError;
use crate::http::headers::RequestHeaders;
use crate::http::precondition::{self, AllowedConditionals};
use crate::state::AppState;

/// `GET /healthz` -- liveness/readiness probe. The shutdown-flag gate in the
/// middleware pipeline already answers `503` for every route during drain,
/// so a reachable handler here always means "healthy".
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// `GET /mcp/tools` -- lists registered tools. The ETag is a constant
/// derived from the API version, so clients can cache with `If-None-Match`.
pub async fn list_tools(
    State(state): State<AppState>,
    Extension(headers): Extension<RequestHeaders>,
) -> Response {
    let etag = format!("tools-{}", state.api_versions_tag());
    if headers.conditionals.if_none_match.as_deref() == Some(etag.as_str()) {
        return not_modified(&etag);
    }

    let tools: Vec<Value> = state
        .registry
        .list()
        .into_iter()
        .map(|meta| {
            json!({
                "name": meta.name,
                "title": meta.title,
                "description": meta.description,
                "inputSchema": meta.input_schema,
                "outputSchema": meta.output_schema,
                "annotations": meta.annotations,
            })
        })
        .collect();

    let mut response = (StatusCode::OK, Json(json!({"tools": tools}))).into_response();
    response
        .headers_mut()
        .insert("ETag", HeaderValue::from_str(&etag).unwrap_or_else(|_| HeaderValue::from_static("tools")));
    response
}

/// `GET /mcp/tools/{toolName}/calls` -- stub; always returns an empty list.
pub async fn list_calls() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"calls": []})))
}

/// `PUT /mcp/tools/{toolName}/calls/{toolCallID}` -- idempotent create-or-retry.
pub async fn create_or_retry(
    State(state): State<AppState>,
    Extension(headers): Extension<RequestHeaders>,
    Path((tool_name, id)): Path<(String, String)>,
    body: axum::body::Bytes,
) -> Result<Response, ApiError> {
    if !headers.conditionals.is_empty() {
        return Err(ToolCallError::BadRequest {
            detail: "conditional headers are not supported on PUT; only Idempotency-Key is consulted".to_string(),
        }
        .into());
    }
    let idempotency_key = headers.idempotency_key.clone().ok_or(ToolCallError::BadRequest {
        detail: "Idempotency-Key header is required on PUT".to_string(),
    })?;
    if idempotency_key.len() > 256 {
        return Err(ToolCallError::BadRequest {
            detail: "Idempotency-Key must not exceed 256 bytes".to_string(),
        }
        .into());
    }

    let handler = state
        .registry
        .get(&tool_name)
        .ok_or_else(|| ToolCallError::UnknownTool { tool_name: tool_name.clone() })?;

    let request_body: Option<Value> = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&body).map_err(|e| ToolCallError::BadRequest {
            detail: format!("invalid JSON body: {e}"),
        })?)
    };

    let ctx = toolcalls_tasks::ToolCallContext::new(state.store.clone(), state.tenant.tenant_id.clone(), tool_name.clone(), id.clone());

    let existing = ctx.get().await;
    match existing {
        Ok(record) if record.is_expired() => {
            // An expired-but-not-yet-reaped record is not a live idempotent
            // retry target; treat the id as free and create fresh.
            create_record(&state, &ctx, &handler, &tool_name, &id, idempotency_key, request_body).await
        }
        Ok(record) if record.idempotency_key.as_deref() == Some(idempotency_key.as_str()) => {
            Ok(tool_call_response(StatusCode::OK, record.project()))
        }
        Ok(_) => Err(ToolCallError::IdempotencyKeyConflict { tool_call_id: id }.into()),
        Err(ToolCallError::NotFound { .. }) => {
            create_record(&state, &ctx, &handler, &tool_name, &id, idempotency_key, request_body).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn create_record(
    state: &AppState,
    ctx: &toolcalls_tasks::ToolCallContext,
    handler: &Arc<dyn toolcalls_tasks::ToolHandler>,
    tool_name: &str,
    id: &str,
    idempotency_key: String,
    request_body: Option<Value>,
) -> Result<Response, ApiError> {
    let mut record = ToolCallRecord::new(
        state.tenant.tenant_id.clone(),
        tool_name.to_string(),
        id.to_string(),
        request_body.clone(),
        Some(idempotency_key),
        None,
    );
    handler.create(ctx, &mut record, request_body, &state.phase_manager).await?;
    let created = ctx.create(record).await?;
    Ok(tool_call_response(StatusCode::CREATED, created.project()))
}

/// `GET /mcp/tools/{toolName}/calls/{toolCallID}` -- fetch current state.
pub async fn get_call(
    State(state): State<AppState>,
    Extension(headers): Extension<RequestHeaders>,
    Path((tool_name, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (ctx, handler, record) = load(&state, &tool_name, &id).await?;

    let outcome = precondition::evaluate(&record.etag, true, true, &AllowedConditionals::match_only(), &headers.conditionals)?;
    if outcome == precondition::PreconditionOutcome::NotModified {
        return Ok(not_modified(&record.etag));
    }

    handler.get(&ctx, &record).await?;
    Ok(tool_call_response(StatusCode::OK, record.project()))
}

/// `POST /mcp/tools/{toolName}/calls/{toolCallID}/advance`.
pub async fn advance_call(
    State(state): State<AppState>,
    Extension(headers): Extension<RequestHeaders>,
    Path((tool_name, id)): Path<(String, String)>,
    body: axum::body::Bytes,
) -> Result<Response, ApiError> {
    let (ctx, handler, mut record) = load(&state, &tool_name, &id).await?;

    precondition::evaluate(&record.etag, true, false, &AllowedConditionals::match_only(), &headers.conditionals)?;

    if !record.status.is_awaiting() {
        return Err(ToolCallError::NotAllowed {
            tool_call_id: id,
            detail: format!("tool call is not awaiting a result (status={})", record.status),
        }
        .into());
    }

    let request: AdvanceRequest = serde_json::from_slice(&body).map_err(|e| ToolCallError::BadRequest {
        detail: format!("invalid advance request body: {e}"),
    })?;

    handler.advance(&ctx, &mut record, request).await?;
    let updated = ctx.persist(record).await?;
    Ok(tool_call_response(StatusCode::OK, updated.project()))
}

/// `POST /mcp/tools/{toolName}/calls/{toolCallID}/cancel`.
pub async fn cancel_call(
    State(state): State<AppState>,
    Extension(headers): Extension<RequestHeaders>,
    Path((tool_name, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (ctx, handler, mut record) = load(&state, &tool_name, &id).await?;

    if record.status.is_terminal() {
        return Ok(tool_call_response(StatusCode::OK, record.project()));
    }

    precondition::evaluate(&record.etag, true, false, &AllowedConditionals::match_only(), &headers.conditionals)?;

    record.status = Status::Canceled;
    record.phase = None;
    record.error = None;
    record.result = None;
    record.elicitation_request = None;
    record.sampling_request = None;

    handler.cancel(&ctx, &mut record).await?;
    let updated = ctx.persist(record).await?;
    Ok(tool_call_response(StatusCode::OK, updated.project()))
}

async fn load(
    state: &AppState,
    tool_name: &str,
    id: &str,
) -> Result<(toolcalls_tasks::ToolCallContext, Arc<dyn toolcalls_tasks::ToolHandler>, ToolCallRecord), ToolCallError> {
    let handler = state
        .registry
        .get(tool_name)
        .ok_or_else(|| ToolCallError::UnknownTool { tool_name: tool_name.to_string() })?;
    let ctx = toolcalls_tasks::ToolCallContext::new(state.store.clone(), state.tenant.tenant_id.clone(), tool_name.to_string(), id.to_string());
    match state
        .store
        .get(&state.tenant.tenant_id, tool_name, id, AccessCondition::none())
        .await?
    {
        GetOutcome::Found(record) => {
            if record.is_expired() {
                return Err(ToolCallError::Expired {
                    tool_call_id: id.to_string(),
                    expired_at: record.expiration.to_rfc3339(),
                });
            }
            Ok((ctx, handler, record))
        }
        GetOutcome::NotModified { .. } => unreachable!("unconditional get never returns NotModified"),
    }
}

fn tool_call_response(status: StatusCode, projected: ProjectedToolCall) -> Response {
    let etag = projected.etag.clone();
    let mut response = (status, Json(projected)).into_response();
    response
        .headers_mut()
        .insert("ETag", HeaderValue::from_str(&etag).unwrap_or_else(|_| HeaderValue::from_static("invalid")));
    response
}

fn not_modified(etag: &str) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    response
        .headers_mut()
        .insert("ETag", HeaderValue::from_str(etag).unwrap_or_else(|_| HeaderValue::from_static("invalid")));
    response
}

impl AppState {
    fn api_versions_tag(&self) -> &str {
        self.api_versions.current()
    }
}
