use crate::core::ZERO_HASH;
use crate::error::{LedgerError, Result};
use crate::utils::sha256_hex;
use serde::{Deserialize, Serialize};

/// Merkle tree over a block's transaction hashes
///
/// Every level is kept so inclusion proofs can be read straight off the tree.
/// Odd levels duplicate their last element; a single leaf is its own root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleTree {
    levels: Vec<Vec<String>>,
}

/// Merkle proof for transaction inclusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Transaction hash being proven
    pub transaction_hash: String,
    /// Merkle root hash
    pub merkle_root: String,
    /// Proof path from the leaf up to the root
    pub proof_path: Vec<ProofElement>,
    /// Index of the transaction in the block
    pub transaction_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofElement {
    /// Sibling hash
    pub hash: String,
    /// Direction: true if sibling is on the right, false if on the left
    pub is_right: bool,
}

impl MerkleTree {
    /// Build the full tree. An empty list gives an empty tree whose root is the zero sentinel.
    pub fn from_hashes(hashes: &[String]) -> Self {
        if hashes.is_empty() {
            return MerkleTree { levels: Vec::new() };
        }

        let mut levels = vec![hashes.to_vec()];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next = Self::next_level(current);
            levels.push(next);
        }

        MerkleTree { levels }
    }

    /// Get the Merkle root hash
    pub fn root(&self) -> String {
        self.levels
            .last()
            .and_then(|top| top.first())
            .cloned()
            .unwrap_or_else(|| ZERO_HASH.to_string())
    }

    /// Number of leaves in the tree
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Generate a Merkle proof for the transaction at the given index
    pub fn generate_proof(&self, transaction_index: usize) -> Result<MerkleProof> {
        let leaves = self.levels.first().ok_or_else(|| {
            LedgerError::Transaction("Cannot prove inclusion in an empty tree".to_string())
        })?;
        if transaction_index >= leaves.len() {
            return Err(LedgerError::Transaction(format!(
                "Transaction index {} out of bounds (max: {})",
                transaction_index,
                leaves.len() - 1
            )));
        }

        let mut proof_path = Vec::new();
        let mut index = transaction_index;
        for level in &self.levels[..self.levels.len() - 1] {
            let is_right = index % 2 == 0;
            let sibling_index = if is_right { index + 1 } else { index - 1 };
            // The last element of an odd level is paired with itself
            let sibling = level.get(sibling_index).unwrap_or(&level[index]);
            proof_path.push(ProofElement {
                hash: sibling.clone(),
                is_right,
            });
            index /= 2;
        }

        Ok(MerkleProof {
            transaction_hash: leaves[transaction_index].clone(),
            merkle_root: self.root(),
            proof_path,
            transaction_index,
        })
    }

    /// Verify a Merkle proof
    pub fn verify_proof(proof: &MerkleProof) -> bool {
        let computed = proof
            .proof_path
            .iter()
            .fold(proof.transaction_hash.clone(), |current, element| {
                if element.is_right {
                    Self::hash_pair(&current, &element.hash)
                } else {
                    Self::hash_pair(&element.hash, &current)
                }
            });
        computed == proof.merkle_root
    }

    fn next_level(current: &[String]) -> Vec<String> {
        current
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => Self::hash_pair(left, right),
                [single] => Self::hash_pair(single, single),
                _ => unreachable!("chunks(2) yields one or two elements"),
            })
            .collect()
    }

    /// Hash two nodes together: `Hash(left || right)` over their hex text
    fn hash_pair(left: &str, right: &str) -> String {
        let mut combined = String::with_capacity(left.len() + right.len());
        combined.push_str(left);
        combined.push_str(right);
        sha256_hex(combined.as_bytes())
    }
}

/// Utility functions for Merkle tree operations
impl MerkleTree {
    /// Calculate the Merkle root without keeping the intermediate levels.
    ///
    /// Empty input yields `"0"`; one hash is returned unchanged.
    pub fn calculate_merkle_root(transaction_hashes: &[String]) -> String {
        let mut current_level = transaction_hashes.to_vec();
        if current_level.is_empty() {
            return ZERO_HASH.to_string();
        }

        while current_level.len() > 1 {
            current_level = Self::next_level(&current_level);
        }

        current_level.swap_remove(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<String> {
        (0..n).map(|i| sha256_hex(format!("tx-{i}").as_bytes())).collect()
    }

    #[test]
    fn test_empty_root_is_zero_sentinel() {
        assert_eq!(MerkleTree::calculate_merkle_root(&[]), "0");
        let tree = MerkleTree::from_hashes(&[]);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), "0");
    }

    #[test]
    fn test_single_hash_is_its_own_root() {
        let hashes = leaves(1);
        assert_eq!(MerkleTree::calculate_merkle_root(&hashes), hashes[0]);
        assert_eq!(MerkleTree::from_hashes(&hashes).root(), hashes[0]);
    }

    #[test]
    fn test_two_hashes_concatenate() {
        let hashes = leaves(2);
        let expected = sha256_hex(format!("{}{}", hashes[0], hashes[1]).as_bytes());
        assert_eq!(MerkleTree::calculate_merkle_root(&hashes), expected);
    }

    #[test]
    fn test_odd_level_duplicates_last() {
        let hashes = leaves(3);
        let left = MerkleTree::hash_pair(&hashes[0], &hashes[1]);
        let right = MerkleTree::hash_pair(&hashes[2], &hashes[2]);
        let expected = MerkleTree::hash_pair(&left, &right);
        assert_eq!(MerkleTree::calculate_merkle_root(&hashes), expected);
    }

    #[test]
    fn test_order_sensitive() {
        let hashes = leaves(2);
        let reversed = vec![hashes[1].clone(), hashes[0].clone()];
        assert_ne!(
            MerkleTree::calculate_merkle_root(&hashes),
            MerkleTree::calculate_merkle_root(&reversed)
        );
    }

    #[test]
    fn test_tree_and_direct_root_agree() {
        for n in 1..=9 {
            let hashes = leaves(n);
            let tree = MerkleTree::from_hashes(&hashes);
            assert_eq!(tree.leaf_count(), n);
            assert_eq!(tree.root(), MerkleTree::calculate_merkle_root(&hashes));
        }
    }

    #[test]
    fn test_every_leaf_has_a_valid_proof() {
        for n in 1..=7 {
            let hashes = leaves(n);
            let tree = MerkleTree::from_hashes(&hashes);
            for i in 0..n {
                let proof = tree.generate_proof(i).unwrap();
                assert_eq!(proof.transaction_hash, hashes[i]);
                assert!(MerkleTree::verify_proof(&proof), "leaf {i} of {n}");
            }
        }
    }

    #[test]
    fn test_tampered_proof_fails() {
        let hashes = leaves(4);
        let tree = MerkleTree::from_hashes(&hashes);
        let mut proof = tree.generate_proof(2).unwrap();
        proof.transaction_hash = hashes[3].clone();
        assert!(!MerkleTree::verify_proof(&proof));
    }

    #[test]
    fn test_proof_index_out_of_bounds() {
        let tree = MerkleTree::from_hashes(&leaves(2));
        assert!(tree.generate_proof(2).is_err());
        assert!(MerkleTree::from_hashes(&[]).generate_proof(0).is_err());
    }
}
