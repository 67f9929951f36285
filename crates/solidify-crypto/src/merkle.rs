use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use solidify_types::{Hash256, Token};

use crate::error::{CryptoError, CryptoResult};
use crate::hasher::{hash_sorted_pair, leaf_hash};

/// Sorted-pair binary Merkle tree over a finalized list of tokens.
///
/// Parents hash the smaller child first, so proofs need no side information
/// and verify with OpenZeppelin's `MerkleProof.verify`. A node without a
/// sibling is carried up to the next level unchanged.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// The committed tokens, in leaf order.
    tokens: Vec<Token>,
    /// All tree nodes, stored level by level.
    /// Level 0 = leaves, last level = `[root]`.
    levels: Vec<Vec<Hash256>>,
}

impl MerkleTree {
    /// Build the tree over `tokens`, keeping their order as leaf order.
    ///
    /// Leaf hashes are computed in parallel; the result does not depend on
    /// scheduling.
    pub fn build(tokens: &[Token]) -> CryptoResult<Self> {
        if tokens.is_empty() {
            return Err(CryptoError::EmptyTree);
        }

        let leaves = tokens
            .par_iter()
            .map(leaf_hash)
            .collect::<CryptoResult<Vec<_>>>()?;

        let levels = build_levels(leaves);
        let tree = Self {
            tokens: tokens.to_vec(),
            levels,
        };
        tracing::debug!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            root = %tree.root(),
            "built merkle tree"
        );
        Ok(tree)
    }

    /// The root hash of the tree.
    pub fn root(&self) -> Hash256 {
        // `build` rejects empty inputs, so the last level holds exactly the root.
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of hashing levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Leaf hashes in token order.
    pub fn leaves(&self) -> &[Hash256] {
        &self.levels[0]
    }

    /// The committed tokens in leaf order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut path = Vec::with_capacity(self.depth());
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = idx ^ 1;
            // A carried-up node has no sibling and contributes nothing.
            if let Some(sibling) = level.get(sibling_idx) {
                path.push(*sibling);
            }
            idx /= 2;
        }

        Some(MerkleProof {
            leaf: self.levels[0][index],
            path,
        })
    }

    /// Inclusion proof for a token, located by content equality.
    pub fn proof_for(&self, token: &Token) -> Option<MerkleProof> {
        let index = self.tokens.iter().position(|t| t == token)?;
        self.proof(index)
    }

    /// All proofs in leaf order, each as a list of `0x`-prefixed hex hashes.
    pub fn proofs_hex(&self) -> Vec<Vec<String>> {
        (0..self.leaf_count())
            .filter_map(|i| self.proof(i))
            .map(|p| p.path.iter().map(Hash256::to_hex).collect())
            .collect()
    }
}

fn build_levels(leaves: Vec<Hash256>) -> Vec<Vec<Hash256>> {
    let mut levels = vec![leaves];

    while levels[levels.len() - 1].len() > 1 {
        let current = &levels[levels.len() - 1];
        let next: Vec<Hash256> = current
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_sorted_pair(left, right),
                // Odd node: carried up unchanged
                [single] => *single,
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect();
        levels.push(next);
    }

    levels
}

/// Merkle inclusion proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// The leaf hash being proven.
    pub leaf: Hash256,
    /// Sibling hashes from the leaf up to the root.
    pub path: Vec<Hash256>,
}

impl MerkleProof {
    /// Recompute the root implied by this proof.
    pub fn compute_root(&self) -> Hash256 {
        self.path
            .iter()
            .fold(self.leaf, |acc, sibling| hash_sorted_pair(&acc, sibling))
    }

    /// Verify the proof against a published root.
    pub fn verify(&self, root: &Hash256) -> bool {
        self.compute_root() == *root
    }
}

/// Verify a proof given as loose parts, mirroring the on-chain verifier.
pub fn verify_proof(proof: &[Hash256], root: &Hash256, leaf: &Hash256) -> bool {
    MerkleProof {
        leaf: *leaf,
        path: proof.to_vec(),
    }
    .verify(root)
}
