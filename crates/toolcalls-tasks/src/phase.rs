//! PhaseManager: autonomous server-side advancement of ToolCalls.
//!
//! Owns [`PhaseQueue`]-driven processing of every ToolCall whose `status`
//! is in the processing class (`submitted`, `running`). Each processing
//! step re-reads the record, hands it to the tool's
//! [`ToolHandler::process_phase`](crate::handler::ToolHandler::process_phase),
//! and persists the result with `IfMatch=<observed etag>`; a `PreconditionFailed`
//! means another actor advanced the record first, so this step is abandoned
//! silently. If the record is still processing after the step, the manager
//! re-enqueues it for a future worker to pick up -- this is what gives
//! fairness across many in-flight ToolCalls.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::context::ToolCallContext;
use crate::error::ToolCallError;
use crate::handler::ToolRegistry;
use crate::queue::{PhaseQueue, ToolCallKey};
use crate::store::ToolCallStore;

/// Interval the background sweeper checks for expired leases.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Drives autonomous advancement of processing-class ToolCalls.
pub struct PhaseManager {
    store: Arc<dyn ToolCallStore>,
    registry: Arc<ToolRegistry>,
    queue: Arc<PhaseQueue>,
}

impl PhaseManager {
    pub fn new(store: Arc<dyn ToolCallStore>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            store,
            registry,
            queue: Arc::new(PhaseQueue::default()),
        }
    }

    pub fn with_queue(mut self, queue: Arc<PhaseQueue>) -> Self {
        self.queue = queue;
        self
    }

    /// Enqueues `(tenant, tool_name, id)` for a future processing step.
    /// Called from the `PUT` handler right after a tool's `create` sets up
    /// autonomous processing, before the HTTP response is written.
    pub fn start_phase(&self, tenant: impl Into<String>, tool_name: impl Into<String>, id: impl Into<String>) {
        self.queue.enqueue(ToolCallKey::new(tenant, tool_name, id));
    }

    /// Runs the dequeue-process loop until `cancel` fires.
    pub async fn run_worker(&self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                () = self.queue.notified() => {}
            }

            while let Some((receipt, key)) = self.queue.try_dequeue() {
                if cancel.is_cancelled() {
                    self.queue.delete(&receipt);
                    return;
                }
                self.process_message(receipt, key).await;
            }
        }
    }

    /// Runs the background lease sweeper until `cancel` fires.
    pub async fn run_sweeper(&self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => {
                    for key in self.queue.sweep() {
                        tracing::warn!(tenant = %key.tenant, tool = %key.tool_name, id = %key.id, "dropping poison phase message");
                    }
                }
            }
        }
    }

    async fn process_message(&self, receipt: String, key: ToolCallKey) {
        let ctx = ToolCallContext::new(
            self.store.clone(),
            key.tenant.clone(),
            key.tool_name.clone(),
            key.id.clone(),
        );

        let mut record = match ctx.get().await {
            Ok(record) => record,
            Err(_) => {
                self.queue.delete(&receipt);
                return;
            }
        };

        if !record.status.is_processing() {
            self.queue.delete(&receipt);
            return;
        }

        let Some(handler) = self.registry.get(&key.tool_name) else {
            tracing::warn!(tool = %key.tool_name, "no handler registered for processing-class tool call");
            self.queue.delete(&receipt);
            return;
        };

        if let Err(err) = handler.process_phase(&ctx, self, &mut record).await {
            tracing::warn!(id = %key.id, error = %err, "process_phase returned an error");
            self.queue.delete(&receipt);
            return;
        }

        match ctx.persist(record.clone()).await {
            Ok(updated) => {
                self.queue.delete(&receipt);
                if updated.status.is_processing() {
                    self.queue.enqueue(key);
                }
            }
            Err(ToolCallError::PreconditionFailed { .. }) => {
                self.queue.delete(&receipt);
            }
            Err(err) => {
                tracing::warn!(id = %key.id, error = %err, "failed to persist phase step");
                self.queue.delete(&receipt);
            }
        }
    }
}
