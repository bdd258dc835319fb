//! Longest-valid-chain conflict resolution.

use crate::{pow::valid_proof, Block, ChainResponse};
use anyhow::Result;
use std::future::Future;
use tracing::{debug, warn};

/// Check every adjacent pair of `chain`: the hash link and the proof link.
///
/// The first block is not checked against any known genesis, so empty and
/// single-block chains are valid.
pub fn valid_chain(chain: &[Block]) -> bool {
    chain.windows(2).all(|pair| {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.previous_hash != prev.hash() {
            debug!(index = cur.index, "previous_hash does not match predecessor");
            return false;
        }
        if !valid_proof(prev.proof, cur.proof) {
            debug!(index = cur.index, "proof does not satisfy difficulty");
            return false;
        }
        true
    })
}

/// Source of peers' chains. The node fetches over HTTP; tests serve chains
/// from memory.
pub trait ChainFetcher: Send + Sync {
    fn fetch_chain(&self, peer: &str) -> impl Future<Output = Result<ChainResponse>> + Send;
}

impl<T: ChainFetcher> ChainFetcher for &T {
    fn fetch_chain(&self, peer: &str) -> impl Future<Output = Result<ChainResponse>> + Send {
        (**self).fetch_chain(peer)
    }
}

/// Walks peers one at a time looking for a chain that beats the local one.
#[derive(Clone, Debug)]
pub struct Resolver<F> {
    fetcher: F,
}

impl<F: ChainFetcher> Resolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// The longest valid chain among `peers` strictly longer than
    /// `local_len`, if any. Peers that fail to answer, answer with garbage,
    /// or offer an invalid chain are logged and skipped. On equal lengths the
    /// peer visited first wins.
    pub async fn best_chain(&self, peers: &[String], local_len: usize) -> Option<Vec<Block>> {
        let mut best_length = local_len;
        let mut best_chain = None;

        for peer in peers {
            let chain = match self.fetch(peer).await {
                Ok(chain) => chain,
                Err(err) => {
                    warn!(peer = %peer, error = %err, "skipping unreachable peer");
                    continue;
                }
            };
            if chain.len() <= best_length {
                debug!(peer = %peer, length = chain.len(), best_length, "peer chain not longer");
                continue;
            }
            if !valid_chain(&chain) {
                warn!(peer = %peer, length = chain.len(), "skipping invalid peer chain");
                continue;
            }
            best_length = chain.len();
            best_chain = Some(chain);
        }

        best_chain
    }

    async fn fetch(&self, peer: &str) -> Result<Vec<Block>> {
        let response = self.fetcher.fetch_chain(peer).await?;
        Ok(response.into_blocks(peer)?)
    }
}
