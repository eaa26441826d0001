//! Shared application state handed to every axum handler via `State`.

use std::sync::Arc;

use toolcalls_tasks::envelope::EnvelopeKey;
use toolcalls_tasks::security::TenantConfig;
use toolcalls_tasks::{PhaseManager, ToolCallStore, ToolRegistry};

use crate::http::shutdown::ShutdownController;
use crate::http::versioning::ApiVersions;

/// Maximum request body size accepted by a ToolCall write route.
pub const MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ToolCallStore>,
    pub registry: Arc<ToolRegistry>,
    pub phase_manager: Arc<PhaseManager>,
    pub tenant: TenantConfig,
    pub api_versions: ApiVersions,
    pub shutdown: ShutdownController,
    pub envelope_key: Option<EnvelopeKey>,
}
