use crate::core::{MerkleProof, MerkleTree, ProofOfWork, Transaction, GENESIS_MINER, ZERO_HASH};
use crate::error::Result;
use crate::utils::current_timestamp;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    block_number: u64,
    hash: String,
    previous_hash: String,
    timestamp: i64,
    merkle_root: String, // Merkle root of all transaction hashes
    nonce: u64,
    difficulty: u32,
    transactions: Vec<Transaction>,
    miner: String,
}

impl Block {
    /// Mine a new block: compute the merkle root once, then search for a nonce
    pub fn new_block(
        previous_hash: String,
        transactions: Vec<Transaction>,
        block_number: u64,
        difficulty: u32,
        miner: &str,
    ) -> Result<Block> {
        let block = Block::unsealed(
            block_number,
            previous_hash,
            current_timestamp()?,
            transactions,
            difficulty,
            miner,
        );

        info!("Starting proof-of-work for block {block_number} with difficulty {difficulty}");
        let block = block.seal()?;
        info!(
            "Proof-of-work completed for block {block_number}: {} (nonce: {})",
            block.hash, block.nonce
        );

        Ok(block)
    }

    /// The chain's only unconditional block. Every field is fixed, so every
    /// ledger with the same difficulty shares the same genesis hash.
    pub fn generate_genesis_block(difficulty: u32) -> Block {
        let mut block = Block::unsealed(
            0,
            ZERO_HASH.to_string(),
            0,
            Vec::new(),
            difficulty,
            GENESIS_MINER,
        );
        block.hash = block.calculate_hash();
        block
    }

    // A block with every header field set except nonce and hash
    pub(crate) fn unsealed(
        block_number: u64,
        previous_hash: String,
        timestamp: i64,
        transactions: Vec<Transaction>,
        difficulty: u32,
        miner: &str,
    ) -> Block {
        let merkle_root = Self::calculate_merkle_root(&transactions);
        Block {
            block_number,
            hash: String::new(),
            previous_hash,
            timestamp,
            merkle_root,
            nonce: 0,
            difficulty,
            transactions,
            miner: miner.to_string(),
        }
    }

    // Run the nonce search and fix nonce and hash
    pub(crate) fn seal(mut self) -> Result<Block> {
        let (nonce, hash) = ProofOfWork::new_proof_of_work(&self).run()?;
        self.nonce = nonce;
        self.hash = hash;
        Ok(self)
    }

    /// Header hash recomputed from the stored fields
    pub fn calculate_hash(&self) -> String {
        ProofOfWork::new_proof_of_work(self).hash_with_nonce(self.nonce)
    }

    /// Calculate Merkle root for a list of transactions
    pub fn calculate_merkle_root(transactions: &[Transaction]) -> String {
        let transaction_hashes: Vec<String> = transactions
            .iter()
            .map(|tx| tx.get_hash().to_string())
            .collect();

        MerkleTree::calculate_merkle_root(&transaction_hashes)
    }

    /// Verify that the block's Merkle root matches its transactions
    pub fn verify_merkle_root(&self) -> bool {
        Self::calculate_merkle_root(&self.transactions) == self.merkle_root
    }

    /// Verify that every transaction still hashes to its stored hash
    pub fn verify_transaction_hashes(&self) -> bool {
        self.transactions.iter().all(Transaction::verify_hash)
    }

    /// Generate a Merkle proof for a transaction in this block
    pub fn generate_merkle_proof(&self, transaction_index: usize) -> Result<MerkleProof> {
        let hashes: Vec<String> = self
            .transactions
            .iter()
            .map(|tx| tx.get_hash().to_string())
            .collect();
        MerkleTree::from_hashes(&hashes).generate_proof(transaction_index)
    }

    /// Verify a Merkle proof against this block's Merkle root
    pub fn verify_merkle_proof(&self, proof: &MerkleProof) -> bool {
        proof.merkle_root == self.merkle_root && MerkleTree::verify_proof(proof)
    }

    pub fn is_genesis(&self) -> bool {
        self.block_number == 0
    }

    pub fn get_block_number(&self) -> u64 {
        self.block_number
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_merkle_root(&self) -> &str {
        self.merkle_root.as_str()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_miner(&self) -> &str {
        self.miner.as_str()
    }

    /// The reward transaction the miner appended last, if any
    pub fn get_reward(&self) -> Option<&Transaction> {
        self.transactions.last().filter(|tx| tx.is_reward())
    }

    // Test-only access for tampering scenarios
    #[cfg(test)]
    pub(crate) fn transactions_mut(&mut self) -> &mut Vec<Transaction> {
        &mut self.transactions
    }

    #[cfg(test)]
    pub(crate) fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    #[cfg(test)]
    pub(crate) fn set_previous_hash(&mut self, previous_hash: &str) {
        self.previous_hash = previous_hash.to_string();
    }

    #[cfg(test)]
    pub(crate) fn set_miner(&mut self, miner: &str) {
        self.miner = miner.to_string();
    }

    #[cfg(test)]
    pub(crate) fn set_hash(&mut self, hash: &str) {
        self.hash = hash.to_string();
    }

    #[cfg(test)]
    pub(crate) fn set_timestamp(&mut self, timestamp: i64) {
        self.timestamp = timestamp;
    }

    #[cfg(test)]
    pub(crate) fn set_block_number(&mut self, block_number: u64) {
        self.block_number = block_number;
    }

    #[cfg(test)]
    pub(crate) fn set_difficulty(&mut self, difficulty: u32) {
        self.difficulty = difficulty;
    }

    #[cfg(test)]
    pub(crate) fn set_merkle_root(&mut self, merkle_root: &str) {
        self.merkle_root = merkle_root.to_string();
    }
}
