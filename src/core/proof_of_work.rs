use crate::core::Block;
use crate::error::{LedgerError, Result};
use crate::utils::{has_leading_zeros, sha256_hex};
use log::debug;

// How often the search reports progress at debug level
const PROGRESS_INTERVAL: u64 = 100_000;

/// Nonce search over a block header.
///
/// The target is textual: the first `difficulty` hex characters of the
/// header hash must all be `'0'`.
pub struct ProofOfWork<'a> {
    block: &'a Block,
    difficulty: u32,
}

impl<'a> ProofOfWork<'a> {
    pub fn new_proof_of_work(block: &'a Block) -> ProofOfWork<'a> {
        ProofOfWork {
            block,
            difficulty: block.get_difficulty(),
        }
    }

    /// Validate proof-of-work for a block: the stored hash must be the header
    /// hash at the stored nonce and must meet the block's difficulty.
    pub fn validate(block: &Block) -> bool {
        let pow = ProofOfWork::new_proof_of_work(block);
        let hash = pow.hash_with_nonce(block.get_nonce());
        hash == block.get_hash() && has_leading_zeros(&hash, pow.difficulty)
    }

    /// Header hash at a given nonce
    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        sha256_hex(&self.prepare_data(nonce))
    }

    // Every header field except the hash itself; strings carry a length prefix
    // so adjacent fields cannot run into each other
    fn prepare_data(&self, nonce: u64) -> Vec<u8> {
        let mut data_bytes = vec![];
        data_bytes.extend(self.block.get_block_number().to_be_bytes());
        push_str(&mut data_bytes, self.block.get_previous_hash());
        data_bytes.extend(self.block.get_timestamp().to_be_bytes());
        push_str(&mut data_bytes, self.block.get_merkle_root());
        data_bytes.extend(nonce.to_be_bytes());
        data_bytes.extend(self.difficulty.to_be_bytes());
        push_str(&mut data_bytes, self.block.get_miner());
        data_bytes
    }

    /// Find the smallest nonce whose header hash meets the difficulty.
    ///
    /// The merkle root is fixed for the whole search; only the nonce moves.
    pub fn run(&self) -> Result<(u64, String)> {
        let mut nonce: u64 = 0;
        loop {
            let hash = self.hash_with_nonce(nonce);
            if has_leading_zeros(&hash, self.difficulty) {
                debug!("Found nonce {nonce} for block {}: {hash}", self.block.get_block_number());
                return Ok((nonce, hash));
            }
            if nonce > 0 && nonce % PROGRESS_INTERVAL == 0 {
                debug!(
                    "Still searching block {} at nonce {nonce} (difficulty {})",
                    self.block.get_block_number(),
                    self.difficulty
                );
            }
            nonce = nonce.checked_add(1).ok_or_else(|| {
                LedgerError::integrity(
                    self.block.get_block_number(),
                    format!("nonce space exhausted at difficulty {}", self.difficulty),
                )
            })?;
        }
    }
}

fn push_str(buf: &mut Vec<u8>, value: &str) {
    buf.extend((value.len() as u64).to_be_bytes());
    buf.extend(value.as_bytes());
}
