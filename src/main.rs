use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use signal_relay::{
    api::{self, AppState},
    config::Args,
    robinhood::RobinhoodClient,
    signal::MasterClient,
    RelayConfig, TradeRelay,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("signal_relay=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Arc::new(RelayConfig::from_args(args).context("Invalid configuration")?);

    info!("Starting signal relay");
    info!("User: {}", config.credentials.username);
    info!("Symbol: {}", config.symbol);
    info!("Master: {}", config.master_url);
    info!("Auto trade: {}", config.auto_trade);

    let broker = Arc::new(RobinhoodClient::new(config.robinhood_api_url.clone())?);
    let signals = Arc::new(MasterClient::new(config.master_url.clone())?);
    let relay = TradeRelay::new(config.clone(), broker, signals);

    // Runs before the listener is bound
    relay.auto_trade().await;

    let state = Arc::new(AppState {
        config: config.clone(),
        relay,
    });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
