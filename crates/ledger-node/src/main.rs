use clap::Parser;
use ledger_node::{Args, NodeConfig};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = NodeConfig::from(Args::parse());
    ledger_node::serve(config).await
}
