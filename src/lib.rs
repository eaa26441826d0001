//! ToolCall execution service: HTTP framing shell, orchestration routes, and
//! the binary's configuration/state wiring. The durable ToolCall domain model
//! (store, PhaseManager, handler contract) lives in the `toolcalls-tasks`
//! crate; this crate is the axum-based shell that exposes it over HTTP.

pub mod config;
pub mod http;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Builds the application router, wired with the middleware pipeline and
/// every route named in the orchestration table (§4.5).
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .route("/healthz", get(http::routes::healthz))
        .route("/mcp/tools", get(http::routes::list_tools))
        .route("/mcp/tools/:toolName/calls", get(http::routes::list_calls))
        .route("/mcp/tools/:toolName/calls/:toolCallID", put(http::routes::create_or_retry))
        .route("/mcp/tools/:toolName/calls/:toolCallID", get(http::routes::get_call))
        .route("/mcp/tools/:toolName/calls/:toolCallID/advance", post(http::routes::advance_call))
        .route("/mcp/tools/:toolName/calls/:toolCallID/cancel", post(http::routes::cancel_call))
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(state.clone(), http::middleware::pipeline))
        .with_state(state)
}
