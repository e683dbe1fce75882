//! ChainRitual gateway daemon.
//!
//! Serves `/wallet`, `/balance`, `/transfer` and `/health`, delegating every
//! wallet operation to the `linera` CLI configured through flags or the
//! environment (see `chainritual-gateway --help`).

use std::sync::Arc;

use anyhow::Context;
use chainritual_gateway::config::{GatewayArgs, GatewayConfig};
use chainritual_gateway::linera::LineraCli;
use chainritual_gateway::{router, AppState};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from(GatewayArgs::parse());
    if !config.faucet_configured() {
        warn!("LINERA_FAUCET_URL is not set; wallet creation will fail");
    }

    let mut state = AppState::new(LineraCli::new(config.linera.clone()))
        .with_genesis_hash(config.genesis_hash.clone());
    state.wallet_path = config.linera.wallet_path.display().to_string();
    state.faucet_configured = config.faucet_configured();

    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    info!(
        addr = %config.listen_addr,
        linera = %config.linera.bin,
        wallet = %config.linera.wallet_path.display(),
        "gateway listening"
    );
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
