//! CLI/environment configuration for the ToolCall HTTP server.
//!
//! Out of scope for the testable core (§1), but the shipped binary still
//! needs a config surface: `clap` derive flags with environment-variable
//! fallbacks, matching the CLI surface named in the external-interfaces
//! section of the design.

use std::time::Duration;

use clap::Parser;
use toolcalls_tasks::security::TenantConfig;

#[derive(Debug, Parser)]
#[command(name = "toolcalls-server", about = "ToolCall execution service")]
pub struct Args {
    /// TCP port to listen on.
    #[arg(long, env = "TOOLCALLS_PORT", default_value_t = 8080)]
    pub port: u16,

    /// API version this deployment serves (see the routing table in §4.6).
    #[arg(long, env = "TOOLCALLS_API_VERSION", default_value = "2025-08-08")]
    pub api_version: String,

    /// Tenant id this deployment serves (multi-tenant auth is out of scope).
    #[arg(long, env = "TOOLCALLS_TENANT_ID", default_value = "default")]
    pub tenant_id: String,

    /// Shared `Authorization` header value. Empty disables the check.
    #[arg(long, env = "TOOLCALLS_AUTH_KEY")]
    pub auth_key: Option<String>,

    /// 64-character hex AES-256 key for the server-data envelope. Omit to
    /// disable the envelope feature.
    #[arg(long, env = "TOOLCALLS_ENVELOPE_KEY")]
    pub envelope_key: Option<String>,

    /// Default ToolCall TTL, in seconds.
    #[arg(long, env = "TOOLCALLS_DEFAULT_TTL_SECS", default_value_t = 24 * 60 * 60)]
    pub default_ttl_secs: i64,

    /// PhaseManager visibility timeout, in seconds.
    #[arg(long, env = "TOOLCALLS_VISIBILITY_TIMEOUT_SECS", default_value_t = 30)]
    pub visibility_timeout_secs: u64,

    /// Delay after flipping the shutting-down flag before cancelling inflight
    /// work, giving a load balancer time to stop sending new traffic.
    #[arg(long, env = "TOOLCALLS_HEALTH_PROBE_DELAY_MS", default_value_t = 2_000)]
    pub health_probe_delay_ms: u64,

    /// Delay after cancellation before the process force-exits.
    #[arg(long, env = "TOOLCALLS_CANCELLATION_DELAY_MS", default_value_t = 5_000)]
    pub cancellation_delay_ms: u64,
}

impl Args {
    pub fn tenant_config(&self) -> TenantConfig {
        let mut config = TenantConfig::default().with_tenant_id(self.tenant_id.clone());
        if let Some(key) = &self.auth_key {
            if !key.is_empty() {
                config = config.with_auth_key(key.clone());
            }
        }
        config
    }

    pub fn health_probe_delay(&self) -> Duration {
        Duration::from_millis(self.health_probe_delay_ms)
    }

    pub fn cancellation_delay(&self) -> Duration {
        Duration::from_millis(self.cancellation_delay_ms)
    }

    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_secs)
    }
}
