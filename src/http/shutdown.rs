//! Graceful shutdown (§4.7), grounded on the teacher's
//! [`crate::server::cancellation`] `CancellationToken` propagation pattern
//! and the corpus's `tokio::select!`-over-`ctrl_c()` idiom for driving a
//! server's shutdown sequence from its `main`.
//!
//! Sequence on SIGINT/SIGTERM:
//! 1. Flip the shutting-down flag; the health probe now answers `503`.
//! 2. Wait `health_probe_delay` so a load balancer stops sending new traffic.
//! 3. Cancel the shared token; in-flight handlers observe it cooperatively.
//! 4. Wait `cancellation_delay` for handlers to drain.
//! 5. Force-exit if anything is still inflight.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Shared shutdown state: the health-gate flag, the cooperative cancellation
/// token, and an inflight-request counter the shutdown sequence drains on.
#[derive(Clone)]
pub struct ShutdownController {
    shutting_down: Arc<AtomicBool>,
    cancel: CancellationToken,
    inflight: Arc<AtomicUsize>,
}

/// RAII guard incrementing the inflight counter on creation and decrementing
/// it on drop, so a request is counted for the whole handler lifetime
/// regardless of how it returns (success, error, or panic unwind).
pub struct InflightGuard(Arc<AtomicUsize>);

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            shutting_down: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            inflight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Marks one request as inflight until the returned guard drops.
    pub fn track_inflight(&self) -> InflightGuard {
        self.inflight.fetch_add(1, Ordering::SeqCst);
        InflightGuard(self.inflight.clone())
    }

    pub fn inflight_count(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    /// Waits for SIGINT (and, on Unix, SIGTERM), then drives the shutdown
    /// sequence. Returns once in-flight work has drained or the
    /// `cancellation_delay` budget expires, in which case the process is
    /// force-exited with status 1.
    pub async fn wait_for_signal_and_drain(
        &self,
        health_probe_delay: Duration,
        cancellation_delay: Duration,
    ) {
        wait_for_termination_signal().await;
        tracing::info!("shutdown signal received, draining");

        self.shutting_down.store(true, Ordering::SeqCst);
        tokio::time::sleep(health_probe_delay).await;

        self.cancel.cancel();
        tokio::time::sleep(cancellation_delay).await;

        if self.inflight_count() > 0 {
            tracing::warn!(
                inflight = self.inflight_count(),
                "forcing exit with requests still inflight"
            );
            std::process::exit(1);
        }
    }
}

#[cfg(unix)]
async fn wait_for_termination_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_termination_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
