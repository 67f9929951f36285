//! Cryptographic commitments for solidify.
//!
//! Provides Keccak-256 hashing of token leaves and a sorted-pair binary Merkle
//! tree whose roots and proofs verify against OpenZeppelin's `MerkleProof`
//! library on-chain.
//!
//! Hashing is delegated to the `sha3` crate.

pub mod error;
pub mod hasher;
pub mod merkle;

pub use error::{CryptoError, CryptoResult};
pub use hasher::{hash_sorted_pair, keccak256, leaf_hash, KeccakHasher};
pub use merkle::{verify_proof, MerkleProof, MerkleTree};
