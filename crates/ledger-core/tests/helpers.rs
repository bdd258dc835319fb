use anyhow::{anyhow, Result};
use ledger_core::{mine, ChainFetcher, ChainResponse, Ledger};
use std::collections::HashMap;

/// Peers living in the same process. Chains cross a JSON boundary exactly as
/// they would over HTTP.
#[derive(Default)]
pub struct LocalNetwork {
    nodes: HashMap<String, String>,
}

impl LocalNetwork {
    pub fn publish(&mut self, address: &str, ledger: &Ledger) {
        let body = serde_json::to_string(&ledger.chain_response()).expect("serialize chain");
        self.nodes.insert(address.to_string(), body);
    }

    pub fn publish_raw(&mut self, address: &str, body: &str) {
        self.nodes.insert(address.to_string(), body.to_string());
    }
}

impl ChainFetcher for LocalNetwork {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
        let body = self
            .nodes
            .get(peer)
            .ok_or_else(|| anyhow!("{peer}: connection refused"))?;
        Ok(serde_json::from_str(body)?)
    }
}

pub fn mine_blocks(ledger: &mut Ledger, count: usize, miner: &str) {
    for _ in 0..count {
        mine::mine_next_block(ledger, miner, mine::SearchStrategy::Sequential)
            .expect("uncancelled search always finds a proof");
    }
}
