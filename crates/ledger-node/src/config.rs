use crate::constants::{DEFAULT_LISTEN, NODE_ID_BYTES};
use clap::Parser;
use ledger_core::{constants::DEFAULT_PEER_TIMEOUT_SECS, mine::SearchStrategy};
use std::{net::SocketAddr, time::Duration};

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "Proof-of-work ledger node")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5001
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Identifier credited with mining rewards (random when omitted)
    #[arg(long)]
    pub node_id: Option<String>,

    /// Peer to register at startup; may be repeated
    #[arg(long = "peer")]
    pub peers: Vec<String>,

    /// Per-peer timeout while resolving conflicts, in seconds
    #[arg(long, default_value_t = DEFAULT_PEER_TIMEOUT_SECS)]
    pub peer_timeout_secs: u64,

    /// Search proofs on every core
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub listen: SocketAddr,
    pub node_id: String,
    pub bootstrap_peers: Vec<String>,
    pub peer_timeout: Duration,
    pub strategy: SearchStrategy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5001)),
            node_id: random_node_id(),
            bootstrap_peers: Vec::new(),
            peer_timeout: Duration::from_secs(DEFAULT_PEER_TIMEOUT_SECS),
            strategy: SearchStrategy::Sequential,
        }
    }
}

impl From<Args> for NodeConfig {
    fn from(args: Args) -> Self {
        Self {
            listen: args.listen,
            node_id: args.node_id.unwrap_or_else(random_node_id),
            bootstrap_peers: args.peers,
            peer_timeout: Duration::from_secs(args.peer_timeout_secs),
            strategy: if args.parallel {
                SearchStrategy::Parallel
            } else {
                SearchStrategy::Sequential
            },
        }
    }
}

/// 128 random bits as 32 hex characters.
pub fn random_node_id() -> String {
    hex::encode(rand::random::<[u8; NODE_ID_BYTES]>())
}
