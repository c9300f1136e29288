use std::sync::Arc;

use anyhow::Context;
use footprint::api::{AppState, create_router};
use footprint::bridge::StreamBridge;
use footprint::config::CONFIG;
use footprint::scanner::CommandScanner;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (also picks up log crate records)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let config = &*CONFIG;

    let scanner = Arc::new(CommandScanner::new(config.scanner.clone()));
    let bridge = StreamBridge::new(scanner, config.report_scanner_exit);
    let state = Arc::new(AppState::new(bridge, config.keep_alive));
    let app = create_router(state, config.static_dir.as_deref());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(
        "listening on {addr}, scanner: {} {:?}",
        config.scanner.program,
        config.scanner.args
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
