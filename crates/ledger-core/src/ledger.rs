use crate::{
    consensus::{valid_chain, ChainFetcher, Resolver},
    constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF},
    error::Result,
    now_secs,
    peers::PeerSet,
    Amount, Block, ChainResponse, Transaction,
};
use tracing::{debug, info};

/// The chain, its pending pool and known peers.
///
/// Every mutation takes `&mut self`; a service sharing one ledger between
/// tasks must put it behind a single lock so block creation and chain
/// replacement never interleave.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    peers: PeerSet,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A ledger holding only the genesis block.
    pub fn new() -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
            peers: PeerSet::new(),
        };
        ledger.new_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        ledger
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false; the genesis block is created with the ledger.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn last_block(&self) -> &Block {
        // `new` appends genesis and replacement only accepts longer chains.
        &self.chain[self.chain.len() - 1]
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    /// Queue a transaction and return the index of the block expected to
    /// include it. The index is a prediction: a chain replacement before the
    /// next block can move it.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> u64 {
        let tx = Transaction::new(sender, recipient, amount);
        debug!(sender = %tx.sender, recipient = %tx.recipient, amount = %tx.amount, "transaction queued");
        self.pending.push(tx);
        self.last_block().index.saturating_add(1)
    }

    /// Append a block carrying every pending transaction.
    ///
    /// `proof` is taken as given; search it with [`crate::pow::proof_of_work`]
    /// first. `previous_hash` defaults to the hash of the current tip.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = previous_hash.unwrap_or_else(|| self.last_block().hash());
        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: now_secs(),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        info!(
            index = block.index,
            proof,
            transactions = block.transactions.len(),
            "block appended"
        );
        self.chain.push(block);
        self.last_block()
    }

    /// Body for `GET /chain`.
    pub fn chain_response(&self) -> ChainResponse {
        ChainResponse::from_chain(&self.chain)
    }

    /// Add a peer; see [`crate::parse_peer_address`] for accepted forms.
    pub fn register_peer(&mut self, address: &str) -> Result<String> {
        let location = self.peers.register(address)?;
        info!(peer = %location, total = self.peers.len(), "peer registered");
        Ok(location)
    }

    /// Swap in `candidate` if it is strictly longer than the local chain and
    /// valid. Checked here as well as by the resolver so that a block
    /// appended while peers were being fetched is never discarded for a chain
    /// that no longer beats ours.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() <= self.chain.len() || !valid_chain(&candidate) {
            return false;
        }
        info!(
            old_length = self.chain.len(),
            new_length = candidate.len(),
            "chain replaced by longer peer chain"
        );
        self.chain = candidate;
        true
    }

    /// Poll every registered peer and adopt the longest valid chain that beats
    /// ours. Unreachable peers and invalid chains are skipped.
    pub async fn resolve_conflicts<F: ChainFetcher>(&mut self, fetcher: &F) -> bool {
        let peers = self.peers.to_vec();
        let best = Resolver::new(fetcher).best_chain(&peers, self.len()).await;
        match best {
            Some(chain) => self.replace_chain(chain),
            None => false,
        }
    }
}
