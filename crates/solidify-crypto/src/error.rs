use solidify_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("cannot build a merkle tree without leaves")]
    EmptyTree,

    #[error("invalid merkle leaf: {0}")]
    Leaf(#[from] TypeError),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
