//! Security configuration for the ToolCall service.
//!
//! Multi-tenant authorization enforcement is explicitly out of scope: the
//! tenant a deployment serves is fixed at startup, not derived per-request
//! from a claim or session. This module provides [`TenantConfig`] (the
//! fixed tenant id and the shared-key check) in place of the owner-resolution
//! priority chain a multi-tenant service would need.
//!
//! # Security Model
//!
//! Authentication is a single fixed `Authorization` header value compared
//! byte-for-byte against the configured key. An empty configured key
//! disables the check entirely (local/dev mode). Tenant isolation itself is
//! structural and lives in the store, not here: every store operation is
//! scoped to `tenant`, and a lookup under the wrong tenant returns `NotFound`.

/// Default tenant id used when no explicit tenant is configured.
pub const DEFAULT_TENANT: &str = "default";

/// Fixed per-deployment security configuration.
///
/// Unlike a multi-tenant service that resolves an owner/tenant from request
/// identity, this configuration names a single tenant the whole deployment
/// serves, plus the shared key checked against the `Authorization` header.
///
/// # Examples
///
/// ```
/// use toolcalls_tasks::security::TenantConfig;
///
/// let config = TenantConfig::default();
/// assert_eq!(config.tenant_id, "default");
/// assert!(config.auth_key.is_none());
///
/// let config = TenantConfig::default()
///     .with_tenant_id("acme-corp")
///     .with_auth_key("s3cr3t");
/// assert_eq!(config.tenant_id, "acme-corp");
/// assert!(config.check_authorization(Some("s3cr3t")));
/// assert!(!config.check_authorization(Some("wrong")));
/// assert!(!config.check_authorization(None));
/// ```
#[derive(Debug, Clone)]
pub struct TenantConfig {
    /// The single tenant this deployment serves.
    pub tenant_id: String,
    /// Shared key compared byte-for-byte against the `Authorization` header.
    /// `None` or an empty string disables the check.
    pub auth_key: Option<String>,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            tenant_id: DEFAULT_TENANT.to_string(),
            auth_key: None,
        }
    }
}

impl TenantConfig {
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    pub fn with_auth_key(mut self, auth_key: impl Into<String>) -> Self {
        self.auth_key = Some(auth_key.into());
        self
    }

    /// Returns `true` if `presented` satisfies the configured key.
    ///
    /// A missing or empty configured key disables the check and always
    /// returns `true`; otherwise `presented` must match byte-for-byte.
    pub fn check_authorization(&self, presented: Option<&str>) -> bool {
        match self.auth_key.as_deref() {
            None | Some("") => true,
            Some(expected) => presented == Some(expected),
        }
    }
}
