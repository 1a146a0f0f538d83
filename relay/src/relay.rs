//! The `relay` crate: a privacy-preserving escrow deposit/withdrawal relay.
//! Mirrors the teacher's `l2.rs` library root, which wires sub-modules
//! together behind a single `start_l2`-style entry point.

pub mod api;
pub mod chain;
pub mod config;
pub mod enclave;
pub mod engine;
pub mod types;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use chain::EthClient;
use config::RelayConfig;
use engine::start_engine;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("chain client error: {0}")]
    ChainClient(#[from] chain::ChainClientError),
    #[error("engine error: {0}")]
    Engine(#[from] engine::EngineError),
    #[error("api server error: {0}")]
    Api(#[from] std::io::Error),
}

/// Connects to the chain, spawns the deposit matcher and batch processor,
/// and serves the HTTP API. Returns only on a fatal API-server error or a
/// Ctrl-C / SIGTERM — the two actor handles are kept alive for the
/// lifetime of the process, the same shape as the teacher's `start_l2`.
pub async fn start_relay(config: RelayConfig) -> Result<(), RelayError> {
    let chain = Arc::new(EthClient::new(&config.eth).await?);
    info!(operator = %format!("{:#x}", chain.operator_address), "starting relay");

    let (engine, _matcher_handle, _processor_handle) =
        start_engine(chain, config.relay.clone()).await?;

    api::start_api(Arc::new(engine), config.server.port).await?;
    Ok(())
}
