//! Wellness Server
//!
//! Serves sentiment and topic classification over HTTP, with a bounded
//! worker pool behind the streaming endpoints.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wellness_server::{create_router, AppState, ConfigOverrides, ServerConfig};
use wellness_stream::StreamProcessor;

#[derive(Parser, Debug)]
#[command(name = "wellness-server")]
#[command(about = "Wellness sentiment and topic classification server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WELLNESS_CONFIG", default_value = "config.yaml")]
    config: String,

    /// Listen address
    #[arg(short = 'l', long, env = "WELLNESS_LISTEN")]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "WELLNESS_PORT")]
    port: Option<u16>,

    /// Number of stream workers
    #[arg(short, long, env = "WELLNESS_WORKERS")]
    workers: Option<usize>,

    /// Capacity of both stream queues
    #[arg(long, env = "WELLNESS_QUEUE_CAPACITY")]
    capacity: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen: self.listen.clone(),
            port: self.port,
            workers: self.workers,
            capacity: self.capacity,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.log_json);

    info!("Starting wellness server");

    // Load configuration
    let config = ServerConfig::load(&cli.config, &cli.overrides())?;
    info!(
        workers = config.processor.workers,
        ingress_capacity = config.processor.ingress_capacity,
        egress_capacity = config.processor.egress_capacity,
        "Configuration loaded successfully"
    );

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Start the worker pool under a root token
    let root = CancellationToken::new();
    let processor = Arc::new(StreamProcessor::new(config.processor.clone())?);
    processor.start(root.clone())?;

    let http_shutdown = root.child_token();
    let state = AppState::new(
        processor.clone(),
        metrics_handle,
        http_shutdown.clone(),
        config.sse_keep_alive(),
    )?;

    let addr = config.socket_addr()?;
    let app = create_router(state, config.cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Wellness server listening on http://{}", addr);

    // Graceful shutdown handler
    let shutdown = async move {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
        http_shutdown.cancel();
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    processor.stop().await;
    root.cancel();

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("wellness=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wellness=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    wellness_telemetry::counters::describe();

    info!("Metrics exporter initialized");
    Ok(handle)
}
