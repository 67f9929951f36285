use sha3::{Digest, Keccak256};
use solidify_types::{Hash256, Token};

use crate::error::CryptoResult;

/// Incremental Keccak-256 hasher (the pre-standard SHA-3 variant used by the
/// EVM's `keccak256`).
#[derive(Clone, Default)]
pub struct KeccakHasher(Keccak256);

impl KeccakHasher {
    pub fn new() -> Self {
        Self(Keccak256::new())
    }

    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn finalize(self) -> Hash256 {
        Hash256::from_bytes(self.0.finalize().into())
    }
}

/// One-shot Keccak-256.
pub fn keccak256(data: &[u8]) -> Hash256 {
    let mut hasher = KeccakHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Hash of a token's 64-byte leaf preimage.
pub fn leaf_hash(token: &Token) -> CryptoResult<Hash256> {
    Ok(keccak256(&token.leaf_preimage()?))
}

/// Parent node of two Merkle nodes: `keccak256(min(a, b) ++ max(a, b))`.
///
/// Commutative in its arguments, which lets proofs omit sibling sides.
pub fn hash_sorted_pair(a: &Hash256, b: &Hash256) -> Hash256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = KeccakHasher::new();
    hasher.update(lo.as_bytes());
    hasher.update(hi.as_bytes());
    hasher.finalize()
}
