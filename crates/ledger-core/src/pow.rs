//! Proof-of-work puzzle.
//!
//! The puzzle binds consecutive proof values only: the digest input is the
//! previous block's proof followed by the candidate, never the block's
//! transactions or timestamp. A valid proof therefore says nothing about the
//! integrity of block content; that is carried by the hash links alone.

use crate::constants::POW_LEADING_ZEROS;
use crate::hash::sha256_hex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// How many candidates the cancellable search tries between flag checks.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// True iff `sha256("{last_proof}{proof}")` starts with four `'0'` hex digits.
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    let digest = sha256_hex(format!("{last_proof}{proof}"));
    digest.bytes().take(POW_LEADING_ZEROS).all(|b| b == b'0')
}

/// Scan upward from zero and return the first proof accepted by
/// [`valid_proof`]. Blocks until one is found.
pub fn proof_of_work(last_proof: u64) -> u64 {
    let mut proof = 0u64;
    while !valid_proof(last_proof, proof) {
        proof = proof.wrapping_add(1);
    }
    debug!(last_proof, proof, "proof found");
    proof
}

/// Same search as [`proof_of_work`], abandoned with `None` once `cancel` is
/// raised.
pub fn proof_of_work_cancellable(last_proof: u64, cancel: &AtomicBool) -> Option<u64> {
    let mut proof = 0u64;
    loop {
        if proof % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            debug!(last_proof, tried = proof, "proof search cancelled");
            return None;
        }
        if valid_proof(last_proof, proof) {
            debug!(last_proof, proof, "proof found");
            return Some(proof);
        }
        proof = proof.wrapping_add(1);
    }
}
