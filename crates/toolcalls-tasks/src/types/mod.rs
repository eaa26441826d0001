//! Wire types for the ToolCall HTTP surface.
//!
//! These types serialize to the JSON shapes clients see. Internal storage
//! concerns (tenant, idempotency key, phase) live in the
//! [`domain`](crate::domain) module and are never re-exported here.

pub mod status;
pub mod toolcall;

pub use status::*;
pub use toolcall::*;
