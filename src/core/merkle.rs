use crate::utils::sha256_digest;
use serde::{Deserialize, Serialize};

/// Merkle root over an ordered list of leaf hashes.
///
/// Pairs are hashed as `SHA-256(left || right)`. An odd trailing leaf is
/// never duplicated: the root of the first `n - 1` leaves is computed and then
/// paired with the last leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleTree {
    leaves: Vec<Vec<u8>>,
    root: Option<Vec<u8>>,
}

/// Inclusion proof for one leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Leaf being proven
    pub leaf_hash: Vec<u8>,
    /// Root the proof resolves to
    pub merkle_root: Vec<u8>,
    /// Sibling hashes from the leaf upwards
    pub proof_path: Vec<ProofElement>,
    /// Index of the leaf
    pub leaf_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofElement {
    /// Sibling hash
    pub hash: Vec<u8>,
    /// Direction: true if sibling is on the right, false if on the left
    pub is_right: bool,
}

impl MerkleTree {
    pub fn from_hashes(hashes: &[Vec<u8>]) -> Self {
        MerkleTree {
            leaves: hashes.to_vec(),
            root: Self::compute(hashes),
        }
    }

    /// Root hash, `None` for an empty tree
    pub fn root(&self) -> Option<&[u8]> {
        self.root.as_deref()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Compute the root of `hashes` without keeping the tree around.
    ///
    /// Zero leaves have no root and a single leaf is its own root.
    pub fn compute(hashes: &[Vec<u8>]) -> Option<Vec<u8>> {
        match hashes.len() {
            0 => None,
            1 => Some(hashes[0].clone()),
            n if n % 2 == 1 => {
                let head = Self::compute(&hashes[..n - 1])?;
                Self::compute(&[head, hashes[n - 1].clone()])
            }
            _ => {
                let level: Vec<Vec<u8>> = hashes
                    .chunks(2)
                    .map(|pair| Self::hash_pair(&pair[0], &pair[1]))
                    .collect();
                Self::compute(&level)
            }
        }
    }

    /// Build an inclusion proof for the leaf at `index`
    pub fn generate_proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaves.len() {
            return None;
        }
        let mut proof_path = Vec::new();
        Self::build_proof_path(&self.leaves, index, &mut proof_path);

        Some(MerkleProof {
            leaf_hash: self.leaves[index].clone(),
            merkle_root: self.root.clone()?,
            proof_path,
            leaf_index: index,
        })
    }

    /// Fold the proof path from the leaf and compare with the claimed root
    pub fn verify_proof(proof: &MerkleProof) -> bool {
        let mut current_hash = proof.leaf_hash.clone();

        for element in &proof.proof_path {
            current_hash = if element.is_right {
                Self::hash_pair(&current_hash, &element.hash)
            } else {
                Self::hash_pair(&element.hash, &current_hash)
            };
        }

        current_hash == proof.merkle_root
    }

    // Mirrors the shape of `compute`: the odd case proves into the first n - 1
    // leaves and then takes one more step against the promoted last leaf.
    fn build_proof_path(hashes: &[Vec<u8>], index: usize, path: &mut Vec<ProofElement>) {
        match hashes.len() {
            0 | 1 => {}
            n if n % 2 == 1 => {
                let head = &hashes[..n - 1];
                if index < n - 1 {
                    Self::build_proof_path(head, index, path);
                    path.push(ProofElement {
                        hash: hashes[n - 1].clone(),
                        is_right: true,
                    });
                } else if let Some(head_root) = Self::compute(head) {
                    path.push(ProofElement {
                        hash: head_root,
                        is_right: false,
                    });
                }
            }
            _ => {
                let sibling = index ^ 1;
                path.push(ProofElement {
                    hash: hashes[sibling].clone(),
                    is_right: sibling > index,
                });
                let level: Vec<Vec<u8>> = hashes
                    .chunks(2)
                    .map(|pair| Self::hash_pair(&pair[0], &pair[1]))
                    .collect();
                Self::build_proof_path(&level, index / 2, path);
            }
        }
    }

    fn hash_pair(left: &[u8], right: &[u8]) -> Vec<u8> {
        let mut combined = Vec::with_capacity(left.len() + right.len());
        combined.extend_from_slice(left);
        combined.extend_from_slice(right);
        sha256_digest(&combined)
    }
}
