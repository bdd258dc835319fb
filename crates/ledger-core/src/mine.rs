use crate::{
    constants::{REWARD_AMOUNT, REWARD_SENDER},
    pow::{proof_of_work_cancellable, valid_proof},
    Block, Ledger,
};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// How a proof is searched for. Both strategies return the same proof.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchStrategy {
    #[default]
    Sequential,
    Parallel,
}

impl SearchStrategy {
    /// Run the search against `last_proof`; `None` once `cancel` is raised.
    pub fn search(self, last_proof: u64, cancel: &AtomicBool) -> Option<u64> {
        match self {
            SearchStrategy::Sequential => proof_of_work_cancellable(last_proof, cancel),
            SearchStrategy::Parallel => {
                let found = (0u64..u64::MAX)
                    .into_par_iter()
                    .find_first(|p| cancel.load(Ordering::Relaxed) || valid_proof(last_proof, *p));
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                found
            }
        }
    }
}

/// Parallel proof search. Rayon splits the candidate range across threads;
/// `find_first` keeps the lowest match, so the answer equals
/// [`crate::pow::proof_of_work`].
pub fn proof_of_work_parallel(last_proof: u64) -> Option<u64> {
    SearchStrategy::Parallel.search(last_proof, &AtomicBool::new(false))
}

/// Mine on top of the ledger's tip: search a proof, credit the reward to
/// `reward_recipient`, and append the block.
///
/// Holds `&mut Ledger` for the whole search, which suits single-owner callers.
/// Services that share a ledger search without the lock instead.
pub fn mine_next_block(
    ledger: &mut Ledger,
    reward_recipient: &str,
    strategy: SearchStrategy,
) -> Option<Block> {
    let last_proof = ledger.last_block().proof;
    let proof = strategy.search(last_proof, &AtomicBool::new(false))?;
    ledger.new_transaction(REWARD_SENDER, reward_recipient, REWARD_AMOUNT);
    let block = ledger.new_block(proof, None).clone();
    info!(
        index = block.index,
        proof,
        transactions = block.transactions.len(),
        "mined block"
    );
    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pow::proof_of_work;

    #[test]
    fn parallel_search_matches_sequential() {
        for last_proof in [100, 35293, 0] {
            assert_eq!(proof_of_work_parallel(last_proof), Some(proof_of_work(last_proof)));
        }
    }

    #[test]
    fn parallel_search_honours_cancel() {
        let cancel = AtomicBool::new(true);
        assert_eq!(SearchStrategy::Parallel.search(100, &cancel), None);
    }

    #[test]
    fn mine_next_block_extends_chain_with_reward() {
        let mut ledger = Ledger::new();
        ledger.new_transaction("Alice", "Bob", 5);
        let block = mine_next_block(&mut ledger, "miner", SearchStrategy::Sequential).unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.proof, 35293);
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.transactions[1].sender, REWARD_SENDER);
        assert_eq!(block.transactions[1].recipient, "miner");
        assert!(ledger.pending().is_empty());
        assert!(crate::valid_chain(ledger.chain()));
    }
}
