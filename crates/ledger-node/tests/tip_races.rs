mod helpers;

use helpers::{spawn_node, test_config};
use ledger_core::{
    mine::{mine_next_block, SearchStrategy},
    pow::proof_of_work,
    valid_chain,
};
use ledger_node::{
    routes::{adopt_chain, mine_with},
    AppState,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

#[tokio::test]
async fn test_mine_restarts_when_tip_moves_during_search() -> anyhow::Result<()> {
    let state = AppState::new(&test_config("node-a"))?;
    let searches = Arc::new(AtomicUsize::new(0));

    let ledger = state.ledger.clone();
    let counter = searches.clone();
    let block = mine_with(&state, move |last_proof, _cancel| {
        let proof = proof_of_work(last_proof);
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            // Another miner lands block 2 while this search is running.
            ledger.blocking_write().new_block(proof, None);
        }
        Some(proof)
    })
    .await?;

    assert_eq!(searches.load(Ordering::SeqCst), 2);
    let ledger = state.ledger.read().await;
    assert_eq!(ledger.len(), 3);
    assert_eq!(block.index, 3);
    assert_eq!(block.previous_hash, ledger.chain()[1].hash());
    assert_eq!(block.proof, proof_of_work(ledger.chain()[1].proof));
    assert_eq!(block.transactions.len(), 1);
    assert_eq!(block.transactions[0].recipient, "node-a");
    assert!(valid_chain(ledger.chain()));
    Ok(())
}

#[tokio::test]
async fn test_adopt_chain_rejects_chain_outgrown_by_local_mining() -> anyhow::Result<()> {
    let state_a = AppState::new(&test_config("node-a"))?;
    let state_b = AppState::new(&test_config("node-b"))?;
    {
        let mut ledger = state_b.ledger.write().await;
        for _ in 0..2 {
            mine_next_block(&mut ledger, "node-b", SearchStrategy::Sequential)
                .expect("proof search is never cancelled here");
        }
    }
    let addr_b = spawn_node(state_b).await;

    let best = state_a
        .resolver
        .best_chain(&[addr_b.to_string()], 1)
        .await
        .expect("peer chain is longer than genesis");
    assert_eq!(best.len(), 3);

    // Node A catches up to the same length before the chain is installed.
    let before = {
        let mut ledger = state_a.ledger.write().await;
        for _ in 0..2 {
            mine_next_block(&mut ledger, "node-a", SearchStrategy::Sequential)
                .expect("proof search is never cancelled here");
        }
        ledger.chain().to_vec()
    };

    assert!(!adopt_chain(&state_a, Some(best)).await);
    assert_eq!(state_a.ledger.read().await.chain(), before.as_slice());
    assert!(!adopt_chain(&state_a, None).await);
    Ok(())
}
