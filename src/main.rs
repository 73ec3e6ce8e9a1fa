use std::sync::Arc;

use jobq::broker::Broker;
use jobq::config::QueueConfig;
use jobq::http;
use jobq::pool::WorkerPool;
use jobq::registry::{self, JobRegistry};
use jobq::service::QueueService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = QueueConfig::from_env()?;

    eprintln!("jobq v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Broker: {}", config.broker_url);
    eprintln!("   Result store: {}", config.result_backend_url);
    eprintln!(
        "   Workers: {} (queue capacity {})",
        config.workers, config.queue_capacity
    );
    eprintln!(
        "   Result retention: {}s",
        config.result_retention.as_secs()
    );
    eprintln!("   API: http://0.0.0.0:{}/api/jobs\n", config.port);

    // ── Registry + Broker ───────────────────────────────────────────────
    let registry = Arc::new(JobRegistry::new(
        config.result_retention,
        config.track_results,
    ));
    let (broker, stream) = Broker::channel(Arc::clone(&registry), config.queue_capacity);

    // Spawn the retention sweep (removes expired terminal statuses)
    let _expiry_handle =
        registry::spawn_expiry_task(Arc::clone(&registry), config.expiry_sweep_interval);

    // ── Worker Pool ─────────────────────────────────────────────────────
    let _pool = WorkerPool::spawn(config.workers, Arc::clone(&registry), stream, config.tick);

    // ── HTTP API ────────────────────────────────────────────────────────
    let service = QueueService::new(broker, registry);
    let app = http::routes(service);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Queue API server started");
    axum::serve(listener, app).await?;

    Ok(())
}
