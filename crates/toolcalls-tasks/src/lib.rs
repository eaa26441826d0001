//! ToolCall domain model, store, and phase manager.
//!
//! This crate implements the core of a durable, resumable tool-execution
//! service: the ToolCall resource and its status state machine, an
//! optimistic-concurrency store layered over a dumb key-value backend, a
//! PhaseManager that drives autonomous server-side advancement via a
//! visibility-timeout queue, the per-tool handler contract, and the
//! AES-256-GCM opaque server-data envelope. The HTTP framing shell that
//! exposes this core over a REST surface lives in the binary crate.
//!
//! # Module Organization
//!
//! - [`types`] - wire types (`ProjectedToolCall`, `AdvanceRequest`, schemas)
//! - [`domain`] - internal representation (`ToolCallRecord`)
//! - [`store`] - `ToolCallStore` trait, generic implementation, backends
//! - [`queue`] - visibility-timeout work queue backing the PhaseManager
//! - [`phase`] - `PhaseManager`, autonomous advancement
//! - [`handler`] - per-tool handler contract and registry
//! - [`tools`] - reference tool handlers (`add`, `pii`, `welcome`, `count`)
//! - [`context`] - ergonomic per-ToolCall store wrapper for handlers
//! - [`security`] - fixed-tenant configuration and shared-key auth check
//! - [`envelope`] - opaque server-data envelope (AES-256-GCM)
//! - [`error`] - rich error types with an HTTP-taxonomy mapping

pub mod context;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod phase;
pub mod queue;
pub mod security;
pub mod store;
pub mod tools;
pub mod types;

pub use context::ToolCallContext;
pub use domain::ToolCallRecord;
pub use envelope::EnvelopeKey;
pub use error::{ErrorCode, ToolCallError};
pub use handler::{ToolHandler, ToolMetadata, ToolRegistry};
pub use phase::PhaseManager;
pub use security::TenantConfig;
pub use store::memory::InMemoryToolCallStore;
pub use store::{AccessCondition, GetOutcome, StoreConfig, ToolCallStore};
pub use types::*;
