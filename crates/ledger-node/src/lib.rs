//! HTTP adapter for the ledger: one shared [`Ledger`] behind a write lock,
//! proof search on the blocking pool, conflict resolution over plain HTTP.

pub mod client;
pub mod config;
mod constants;
pub mod routes;

pub use client::HttpChainFetcher;
pub use config::{Args, NodeConfig};
pub use routes::router;

use anyhow::{Context, Result};
use ledger_core::{mine::SearchStrategy, Ledger, Resolver};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub resolver: Arc<Resolver<HttpChainFetcher>>,
    pub node_id: Arc<str>,
    pub strategy: SearchStrategy,
    /// Raised on shutdown; aborts proof searches in flight.
    pub shutdown: Arc<AtomicBool>,
}

impl AppState {
    /// Fresh ledger with the configured bootstrap peers registered.
    pub fn new(config: &NodeConfig) -> Result<Self> {
        let mut ledger = Ledger::new();
        for peer in &config.bootstrap_peers {
            ledger
                .register_peer(peer)
                .with_context(|| format!("bootstrap peer {peer:?}"))?;
        }
        Ok(Self {
            ledger: Arc::new(RwLock::new(ledger)),
            resolver: Arc::new(Resolver::new(HttpChainFetcher::new(config.peer_timeout)?)),
            node_id: Arc::from(config.node_id.as_str()),
            strategy: config.strategy,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Bind `config.listen` and serve until Ctrl-C.
pub async fn serve(config: NodeConfig) -> Result<()> {
    let state = AppState::new(&config)?;
    let shutdown = state.shutdown.clone();

    let listener = TcpListener::bind(config.listen).await?;
    info!(
        node_id = %config.node_id,
        peers = config.bootstrap_peers.len(),
        "ledger-node listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
            shutdown.store(true, Ordering::Relaxed);
        })
        .await?;
    Ok(())
}
