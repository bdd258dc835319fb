pub(crate) const DEFAULT_LISTEN: &str = "127.0.0.1:5001";
pub(crate) const NODE_ID_BYTES: usize = 16;

pub(crate) const MSG_BLOCK_FORGED: &str = "New block forged";
pub(crate) const MSG_NODES_ADDED: &str = "New nodes have been added";
pub(crate) const MSG_CHAIN_REPLACED: &str = "Our chain was replaced";
pub(crate) const MSG_CHAIN_AUTHORITATIVE: &str = "Our chain is authoritative";
