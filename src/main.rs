//! News aggregator server entrypoint.
//! Loads config, opens the store, starts periodic ingestion and serves the API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use news_aggregator::{
    config::AppConfig, create_router, ingest::IngestService, metrics::Metrics, state::AppState,
    store::Stores,
};

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "news_aggregator=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let metrics = Metrics::init()?;

    let stores = Stores::open(&config.database_url)
        .await
        .with_context(|| format!("opening store at {}", config.database_url))?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("APP_HOST/PORT do not form a socket address")?;
    let interval = config.ingest.interval();

    let state = AppState::new(config, stores);
    let ingest = IngestService::start(Arc::clone(&state.ingest), interval);

    let app = create_router(state).merge(metrics.router());

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ingest.stop().await;
    Ok(())
}
