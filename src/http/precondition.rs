//! RFC 7232 conditional-header precondition evaluation.
//!
//! Given a resource's current etag and the conditional headers a request
//! carried, decides whether the request may proceed, should see `304 Not
//! Modified`, or must fail with `412 Precondition Failed`. Every route
//! declares which conditional headers it allows (§4.6's
//! `AllowedConditionals`); a request carrying a header the route doesn't
//! allow is rejected with `BadRequest` before any matching is attempted.

use toolcalls_tasks::ToolCallError;

/// Which RFC 7232 conditional headers a route accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowedConditionals {
    pub if_match: bool,
    pub if_none_match: bool,
}

impl AllowedConditionals {
    /// `If-Match`/`If-None-Match` only; no `*-Since` variants. This is the
    /// `AllowedConditionals=match` used by every ToolCall route in §4.5 --
    /// `If-Modified-Since`/`If-Unmodified-Since` are parsed at the framing
    /// layer but never declared allowed by a route (§9 open question).
    pub fn match_only() -> Self {
        Self {
            if_match: true,
            if_none_match: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// The conditional headers a single request carried.
#[derive(Debug, Clone, Default)]
pub struct RequestConditionals {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
}

impl RequestConditionals {
    pub fn is_empty(&self) -> bool {
        self.if_match.is_none() && self.if_none_match.is_none()
    }
}

/// Result of evaluating preconditions against a resource's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionOutcome {
    /// No precondition blocked the request; proceed to the handler.
    Proceed,
    /// `If-None-Match` matched on a safe method: respond `304` with no body.
    NotModified,
}

/// Evaluates `request` against `resource_etag`, given what the route allows.
///
/// `is_safe_method` distinguishes GET/HEAD (which may yield `NotModified`)
/// from PUT/POST (where an `If-None-Match` match is a `PreconditionFailed`,
/// never a `304`).
pub fn evaluate(
    resource_etag: &str,
    resource_exists: bool,
    is_safe_method: bool,
    allowed: &AllowedConditionals,
    request: &RequestConditionals,
) -> Result<PreconditionOutcome, ToolCallError> {
    if request.if_match.is_some() && !allowed.if_match {
        return Err(ToolCallError::BadRequest {
            detail: "If-Match is not supported on this route".to_string(),
        });
    }
    if request.if_none_match.is_some() && !allowed.if_none_match {
        return Err(ToolCallError::BadRequest {
            detail: "If-None-Match is not supported on this route".to_string(),
        });
    }

    if let Some(if_match) = &request.if_match {
        let matches = if_match == "*" {
            resource_exists
        } else {
            if_match == resource_etag
        };
        if !matches {
            return Err(ToolCallError::PreconditionFailed {
                tool_call_id: String::new(),
                expected: if_match.clone(),
                actual: resource_etag.to_string(),
            });
        }
        return Ok(PreconditionOutcome::Proceed);
    }

    if let Some(if_none_match) = &request.if_none_match {
        let matches = if_none_match == "*" {
            resource_exists
        } else {
            if_none_match == resource_etag
        };
        if matches {
            return if is_safe_method {
                Ok(PreconditionOutcome::NotModified)
            } else {
                Err(ToolCallError::PreconditionFailed {
                    tool_call_id: String::new(),
                    expected: if_none_match.clone(),
                    actual: resource_etag.to_string(),
                })
            };
        }
    }

    Ok(PreconditionOutcome::Proceed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_conditionals_proceeds() {
        let outcome = evaluate("e1", true, true, &AllowedConditionals::match_only(), &RequestConditionals::default());
        assert_eq!(outcome.unwrap(), PreconditionOutcome::Proceed);
    }

    #[test]
    fn if_match_mismatch_is_precondition_failed() {
        let request = RequestConditionals {
            if_match: Some("wrong".to_string()),
            if_none_match: None,
        };
        let result = evaluate("e1", true, false, &AllowedConditionals::match_only(), &request);
        assert!(matches!(result, Err(ToolCallError::PreconditionFailed { .. })));
    }

    #[test]
    fn if_match_star_matches_any_existing_resource() {
        let request = RequestConditionals {
            if_match: Some("*".to_string()),
            if_none_match: None,
        };
        let outcome = evaluate("e1", true, false, &AllowedConditionals::match_only(), &request);
        assert_eq!(outcome.unwrap(), PreconditionOutcome::Proceed);
    }

    #[test]
    fn if_none_match_hit_on_safe_method_is_not_modified() {
        let request = RequestConditionals {
            if_match: None,
            if_none_match: Some("e1".to_string()),
        };
        let outcome = evaluate("e1", true, true, &AllowedConditionals::match_only(), &request);
        assert_eq!(outcome.unwrap(), PreconditionOutcome::NotModified);
    }

    #[test]
    fn if_none_match_hit_on_unsafe_method_is_precondition_failed() {
        let request = RequestConditionals {
            if_match: None,
            if_none_match: Some("e1".to_string()),
        };
        let result = evaluate("e1", true, false, &AllowedConditionals::match_only(), &request);
        assert!(matches!(result, Err(ToolCallError::PreconditionFailed { .. })));
    }

    #[test]
    fn if_none_match_miss_proceeds() {
        let request = RequestConditionals {
            if_match: None,
            if_none_match: Some("stale".to_string()),
        };
        let outcome = evaluate("e1", true, true, &AllowedConditionals::match_only(), &request);
        assert_eq!(outcome.unwrap(), PreconditionOutcome::Proceed);
    }

    #[test]
    fn disallowed_header_is_bad_request() {
        let request = RequestConditionals {
            if_match: Some("e1".to_string()),
            if_none_match: None,
        };
        let result = evaluate("e1", true, false, &AllowedConditionals::none(), &request);
        assert!(matches!(result, Err(ToolCallError::BadRequest { .. })));
    }
}
