//! Domain types for internal task representation.
//!
//! These types separate internal storage concerns from wire-format concerns.
//! [`ToolCallRecord`] is the store's internal representation, carrying fields
//! such as `tenant`, `idempotencyKey`, `phase`, and `internal` that never
//! cross the wire. [`crate::types::toolcall::ProjectedToolCall`] is the
//! client-visible projection derived from it.

pub mod record;

pub use record::*;
