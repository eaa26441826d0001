//! ToolCall record -- the store's internal representation of a ToolCall.
//!
//! [`ToolCallRecord`] carries the full set of fields from the data model,
//! including `tenant`, `idempotencyKey`, `phase`, and `internal`, which never
//! cross the wire. [`ToolCallRecord::project`] derives the client-visible
//! [`ProjectedToolCall`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::status::Status;
use crate::types::toolcall::{ElicitationRequest, ProjectedToolCall, SamplingRequest};

/// Default lifetime for a newly created ToolCall absent an explicit TTL.
pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

/// Internal storage representation of a ToolCall.
///
/// Identified by `(tenant, tool_name, id)`. All fields are public so that
/// store implementations have full access; construct with [`ToolCallRecord::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    pub tenant: String,
    pub tool_name: String,
    pub id: String,
    pub expiration: DateTime<Utc>,
    pub idempotency_key: Option<String>,
    pub etag: String,
    pub phase: Option<String>,
    pub status: Status,
    pub request: Option<Value>,
    pub progress: Option<Value>,
    pub result: Option<Value>,
    pub error: Option<Value>,
    pub sampling_request: Option<SamplingRequest>,
    pub elicitation_request: Option<ElicitationRequest>,
    /// Opaque string the server round-trips through the client; see the
    /// server-data envelope (§4.8 in the design doc).
    pub server_state: Option<String>,
    /// Visible only to server-side code; never projected to the client.
    pub internal: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl ToolCallRecord {
    /// Creates a new record in `submitted` status with a freshly minted etag.
    ///
    /// `ttl_secs` defaults to [`DEFAULT_TTL_SECS`] when `None`.
    pub fn new(
        tenant: String,
        tool_name: String,
        id: String,
        request: Option<Value>,
        idempotency_key: Option<String>,
        ttl_secs: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        let ttl = ttl_secs.unwrap_or(DEFAULT_TTL_SECS);
        let expiration = now
            .checked_add_signed(Duration::seconds(ttl))
            .unwrap_or(now);

        Self {
            tenant,
            tool_name,
            id,
            expiration,
            idempotency_key,
            etag: fresh_etag(),
            phase: None,
            status: Status::Submitted,
            request,
            progress: None,
            result: None,
            error: None,
            sampling_request: None,
            elicitation_request: None,
            server_state: None,
            internal: None,
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Returns `true` if `expiration` has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expiration
    }

    /// Mints a fresh etag and bumps `last_updated_at`. Callers must invoke
    /// this on every mutation that will be persisted; the store does not
    /// do this implicitly.
    pub fn touch(&mut self) {
        self.etag = fresh_etag();
        self.last_updated_at = Utc::now();
    }

    /// Derives the client-visible projection, omitting `tenant`,
    /// `idempotencyKey`, `phase`, and `internal`.
    pub fn project(&self) -> ProjectedToolCall {
        ProjectedToolCall {
            toolname: self.tool_name.clone(),
            id: self.id.clone(),
            expiration: self.expiration.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            etag: self.etag.clone(),
            status: self.status,
            request: self.request.clone(),
            sampling_request: self.sampling_request.clone(),
            elicitation_request: self.elicitation_request.clone(),
            server_data: self.server_state.clone(),
            progress: self.progress.clone(),
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

/// Mints an opaque, monotonic-by-time etag. Uniqueness is the contract, not
/// numeric ordering; callers MUST NOT parse or compare etags as numbers.
pub fn fresh_etag() -> String {
    format!("{:x}-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0), uuid::Uuid::new_v4())
}

/// Validates that a JSON value does not exceed the maximum nesting depth.
/// Used by the store to bound opaque bodies (`request`, `internal`, ...).
pub fn validate_json_depth(value: &Value, max_depth: usize) -> Result<(), String> {
    check_depth(value, 0, max_depth)
}

fn check_depth(value: &Value, current_depth: usize, max_depth: usize) -> Result<(), String> {
    if current_depth > max_depth {
        return Err(format!(
            "json nesting depth {current_depth} exceeds maximum {max_depth}"
        ));
    }
    match value {
        Value::Array(arr) => {
            for item in arr {
                check_depth(item, current_depth + 1, max_depth)?;
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                check_depth(v, current_depth + 1, max_depth)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Validates that no string value within a JSON structure exceeds the
/// maximum byte length.
pub fn validate_json_string_lengths(value: &Value, max_length: usize) -> Result<(), String> {
    match value {
        Value::String(s) if s.len() > max_length => Err(format!(
            "string value length {} bytes exceeds maximum {max_length} bytes",
            s.len()
        )),
        Value::Array(arr) => {
            for item in arr {
                validate_json_string_lengths(item, max_length)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for v in map.values() {
                validate_json_string_lengths(v, max_length)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make(tenant: &str, tool: &str, id: &str) -> ToolCallRecord {
        ToolCallRecord::new(
            tenant.to_string(),
            tool.to_string(),
            id.to_string(),
            Some(json!({"x": 1})),
            Some("k1".to_string()),
            None,
        )
    }

    #[test]
    fn new_record_is_submitted() {
        let r = make("t1", "add", "id-1");
        assert_eq!(r.status, Status::Submitted);
        assert!(r.result.is_none());
        assert!(!r.etag.is_empty());
    }

    #[test]
    fn expiration_is_after_creation() {
        let r = make("t1", "add", "id-1");
        assert!(r.expiration > r.created_at);
    }

    #[test]
    fn touch_changes_etag_and_bumps_timestamp() {
        let mut r = make("t1", "add", "id-1");
        let old_etag = r.etag.clone();
        let old_updated = r.last_updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        r.touch();
        assert_ne!(r.etag, old_etag);
        assert!(r.last_updated_at >= old_updated);
    }

    #[test]
    fn is_expired_false_for_future_expiry() {
        let r = make("t1", "add", "id-1");
        assert!(!r.is_expired());
    }

    #[test]
    fn is_expired_true_for_past_expiry() {
        let mut r = make("t1", "add", "id-1");
        r.expiration = Utc::now() - Duration::seconds(10);
        assert!(r.is_expired());
    }

    #[test]
    fn project_omits_internal_fields() {
        let mut r = make("t1", "add", "id-1");
        r.internal = Some(json!({"secret": true}));
        let projected = r.project();
        let json = serde_json::to_value(&projected).unwrap();
        assert!(json.get("tenant").is_none());
        assert!(json.get("internal").is_none());
        assert!(json.get("idempotencyKey").is_none());
        assert!(json.get("phase").is_none());
        assert_eq!(json["toolname"], "add");
    }

    #[test]
    fn serialization_uses_camel_case() {
        let r = make("t1", "add", "id-1");
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("toolName").is_some());
        assert!(json.get("idempotencyKey").is_some());
        assert!(json.get("lastUpdatedAt").is_some());
    }

    #[test]
    fn validate_json_depth_rejects_bomb() {
        let mut value = json!(1);
        for _ in 0..11 {
            value = json!({"n": value});
        }
        assert!(validate_json_depth(&value, 10).is_err());
    }

    #[test]
    fn validate_json_string_lengths_rejects_long_string() {
        let long = "x".repeat(100);
        assert!(validate_json_string_lengths(&json!(long), 10).is_err());
    }

    #[test]
    fn fresh_etag_is_unique_across_calls() {
        let a = fresh_etag();
        let b = fresh_etag();
        assert_ne!(a, b);
    }
}
