use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid peer address: {0:?}")]
    InvalidAddress(String),

    #[error("malformed chain from {peer}: {reason}")]
    MalformedChain { peer: String, reason: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
