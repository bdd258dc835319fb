pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// Number of leading `'0'` hex characters a proof digest must carry.
pub const POW_LEADING_ZEROS: usize = 4;

pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Sender used for mining rewards; it marks newly created coins.
pub const REWARD_SENDER: &str = "0";
pub const REWARD_AMOUNT: u64 = 1;

pub const DEFAULT_PEER_TIMEOUT_SECS: u64 = 5;
