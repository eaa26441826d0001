//! ToolCall execution service entry point.
//!
//! Wires the in-memory store, the reference tool registry, the PhaseManager
//! background workers, and the axum HTTP framing shell together, then runs
//! until a termination signal starts the graceful-shutdown sequence (§4.7).

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use toolcalls::config::Args;
use toolcalls::http::shutdown::ShutdownController;
use toolcalls::http::versioning::ApiVersions;
use toolcalls::state::AppState;
use toolcalls::build_router;

use toolcalls_tasks::envelope::EnvelopeKey;
use toolcalls_tasks::queue::{PhaseQueue, POISON_THRESHOLD};
use toolcalls_tasks::store::memory::InMemoryToolCallStore;
use toolcalls_tasks::tools::{AddHandler, CountHandler, PiiHandler, WelcomeHandler};
use toolcalls_tasks::{PhaseManager, ToolCallStore, ToolRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let store: Arc<dyn ToolCallStore> = Arc::new(InMemoryToolCallStore::new());

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(AddHandler));
    registry.register(Arc::new(PiiHandler));
    registry.register(Arc::new(WelcomeHandler));
    registry.register(Arc::new(CountHandler));
    let registry = Arc::new(registry);

    let queue = Arc::new(PhaseQueue::new(args.visibility_timeout(), POISON_THRESHOLD));
    let phase_manager = Arc::new(
        PhaseManager::new(store.clone(), registry.clone()).with_queue(queue),
    );

    let envelope_key = args
        .envelope_key
        .as_deref()
        .map(EnvelopeKey::from_hex)
        .transpose()?;

    let shutdown = ShutdownController::new();

    let state = AppState {
        store,
        registry,
        phase_manager: phase_manager.clone(),
        tenant: args.tenant_config(),
        api_versions: ApiVersions::new(args.api_version.clone()),
        shutdown: shutdown.clone(),
        envelope_key,
    };

    let worker_cancel = shutdown.cancellation_token();
    let sweeper_cancel = shutdown.cancellation_token();
    let worker = tokio::spawn({
        let phase_manager = phase_manager.clone();
        async move { phase_manager.run_worker(worker_cancel).await }
    });
    let sweeper = tokio::spawn({
        let phase_manager = phase_manager.clone();
        let sweep_interval = toolcalls_tasks::phase::DEFAULT_SWEEP_INTERVAL;
        async move { phase_manager.run_sweeper(sweep_interval, sweeper_cancel).await }
    });

    let app = build_router(state);

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    tracing::info!(port = args.port, "listening");

    let health_probe_delay = args.health_probe_delay();
    let cancellation_delay = args.cancellation_delay();

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        () = shutdown.wait_for_signal_and_drain(health_probe_delay, cancellation_delay) => {
            tracing::info!("drain complete, exiting");
        }
    }

    worker.abort();
    sweeper.abort();
    Ok(())
}
