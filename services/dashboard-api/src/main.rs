//! Dashboard API Server
//!
//! Serves the land-cover change dashboards.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use dashboard_api::config::DashboardConfig;
use dashboard_api::state::AppState;
use dashboard_api::{build_router, geo_env};

/// Dashboard API Server
#[derive(Parser, Debug)]
#[command(name = "dashboard-api")]
#[command(about = "HTTP backend for the land-cover change dashboards")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "DASHBOARD_LISTEN_ADDR")]
    listen: String,

    /// Configuration file
    #[arg(short, long, default_value = "config/dashboard.yaml", env = "DASHBOARD_CONFIG")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "DASHBOARD_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let config = DashboardConfig::load(&args.config)?;

    // PROJ reads its environment once; export it while still single-threaded
    geo_env::configure(config.proj_data.as_deref());

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build().context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args.listen, config))
}

async fn run_server(listen: String, config: DashboardConfig) -> Result<()> {
    info!("Starting dashboard API server");

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    let state = Arc::new(AppState::new(config));
    if !state.is_ready() {
        tracing::warn!(root = %state.layout.root.display(), "Data root does not exist yet");
    }

    let app = build_router(state, prometheus);

    let addr: SocketAddr = listen.parse().with_context(|| format!("Invalid listen address: {}", listen))?;

    info!("Dashboard API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
