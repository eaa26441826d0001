//! ToolCall status state machine.
//!
//! A [`Status`] progresses through a fixed transition graph. Terminal states
//! reject every transition except `Cancel`, which is a no-op that returns
//! the existing record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ToolCallError;

/// Lifecycle status of a ToolCall.
///
/// # Examples
///
/// ```
/// use toolcalls_tasks::Status;
///
/// assert!(!Status::Running.is_terminal());
/// assert!(Status::Running.can_transition_to(&Status::Success));
/// assert!(!Status::Success.can_transition_to(&Status::Running));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    /// Transient initial state, typically replaced within the same handler.
    Submitted,
    /// The PhaseManager owns advancement.
    Running,
    /// Only a client POST `/advance` with a matching ETag can drive progress.
    AwaitingSamplingResult,
    /// Only a client POST `/advance` with a matching ETag can drive progress.
    AwaitingElicitationResult,
    /// Terminal: completed successfully.
    Success,
    /// Terminal: completed with an error.
    Failed,
    /// Terminal: cancelled by the client.
    Canceled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Running => write!(f, "running"),
            Self::AwaitingSamplingResult => write!(f, "awaitingSamplingResult"),
            Self::AwaitingElicitationResult => write!(f, "awaitingElicitationResult"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

impl Status {
    /// Terminal states: `success`, `failed`, `canceled`. No further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Canceled)
    }

    /// The PhaseManager owns advancement while a ToolCall is in this class.
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Submitted | Self::Running)
    }

    /// Only a client-supplied advance result can drive progress from here.
    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            Self::AwaitingSamplingResult | Self::AwaitingElicitationResult
        )
    }

    /// Returns `true` if transitioning from this status to `next` is allowed
    /// by the state machine graph. Terminal states never transition, including
    /// to themselves; `Cancel` on a terminal record is handled as a no-op by
    /// the caller rather than as a transition.
    pub fn can_transition_to(&self, next: &Self) -> bool {
        match self {
            Self::Submitted | Self::Running => matches!(
                next,
                Self::Running
                    | Self::AwaitingSamplingResult
                    | Self::AwaitingElicitationResult
                    | Self::Success
                    | Self::Failed
            ),
            Self::AwaitingSamplingResult | Self::AwaitingElicitationResult => matches!(
                next,
                Self::Running | Self::Success | Self::Failed | Self::Canceled
            ),
            Self::Success | Self::Failed | Self::Canceled => false,
        }
    }

    /// `Cancel` is allowed from any non-terminal state and is always routed
    /// through this helper rather than [`can_transition_to`] so that a
    /// terminal-to-terminal cancel can be special-cased as a no-op by callers.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Validates a transition, returning a contextual error on rejection.
    ///
    /// `* → canceled` is checked via [`can_cancel`](Self::can_cancel) rather
    /// than [`can_transition_to`](Self::can_transition_to): cancellation is
    /// allowed from any non-terminal state regardless of the normal
    /// processing/awaiting transition graph.
    pub fn validate_transition(&self, tool_call_id: &str, next: &Self) -> Result<(), ToolCallError> {
        let allowed = if matches!(next, Self::Canceled) {
            self.can_cancel()
        } else {
            self.can_transition_to(next)
        };
        if allowed {
            Ok(())
        } else {
            Err(ToolCallError::InvalidTransition {
                tool_call_id: tool_call_id.to_string(),
                from: *self,
                to: *next,
            })
        }
    }
}
