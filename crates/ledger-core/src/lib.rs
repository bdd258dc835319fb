pub mod consensus;
pub mod constants;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod mine;
pub mod peers;
pub mod pow;

pub use consensus::{valid_chain, ChainFetcher, Resolver};
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use peers::{parse_peer_address, PeerSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Transfer amount. Any JSON number is accepted and kept in the exact form it
/// was submitted, so `1` and `1.0` hash differently just as they print
/// differently.
pub type Amount = serde_json::Number;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    fn canonical_value(&self) -> Value {
        json!({
            "sender": self.sender,
            "recipient": self.recipient,
            "amount": self.amount,
        })
    }
}

/// A block as kept in the chain. Its hash is not stored; see [`Block::hash`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the Unix epoch, with sub-second precision.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// SHA-256 over the canonical encoding of the five block fields.
    pub fn hash(&self) -> String {
        hash::canonical_digest(&self.canonical_value())
    }

    pub fn canonical_value(&self) -> Value {
        let transactions: Vec<Value> = self
            .transactions
            .iter()
            .map(Transaction::canonical_value)
            .collect();
        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "transactions": transactions,
            "proof": self.proof,
            "previous_hash": self.previous_hash,
        })
    }

    pub fn hashed(&self) -> HashedBlock {
        HashedBlock::from(self)
    }
}

/// External representation of a block: its fields plus the derived hash.
///
/// Receivers never trust `hash`; it is recomputed during validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HashedBlock {
    pub index: u64,
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
    #[serde(default)]
    pub hash: String,
}

impl From<&Block> for HashedBlock {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index,
            timestamp: block.timestamp,
            transactions: block.transactions.clone(),
            proof: block.proof,
            previous_hash: block.previous_hash.clone(),
            hash: block.hash(),
        }
    }
}

impl From<HashedBlock> for Block {
    fn from(hashed: HashedBlock) -> Self {
        Self {
            index: hashed.index,
            timestamp: hashed.timestamp,
            transactions: hashed.transactions,
            proof: hashed.proof,
            previous_hash: hashed.previous_hash,
        }
    }
}

/// Body of `GET /chain`, the format nodes exchange during conflict resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<HashedBlock>,
    pub length: usize,
}

impl ChainResponse {
    pub fn from_chain(chain: &[Block]) -> Self {
        Self {
            chain: chain.iter().map(Block::hashed).collect(),
            length: chain.len(),
        }
    }

    /// Strip the advertised hashes, rejecting a body whose `length` does not
    /// match the blocks it carries.
    pub fn into_blocks(self, peer: &str) -> Result<Vec<Block>> {
        if self.length != self.chain.len() {
            return Err(LedgerError::MalformedChain {
                peer: peer.to_string(),
                reason: format!(
                    "advertised length {} but carried {} blocks",
                    self.length,
                    self.chain.len()
                ),
            });
        }
        Ok(self.chain.into_iter().map(Block::from).collect())
    }
}

/// Wall-clock seconds since the Unix epoch.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
