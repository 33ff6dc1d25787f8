//! Core ledger functionality
//!
//! This module contains the fundamental ledger components including
//! transactions, blocks, merkle aggregation, proof-of-audit, proof-of-work,
//! and the ledger that ties them together.

pub mod audit;
pub mod block;
pub mod ledger;
pub mod merkle;
pub mod monetary;
pub mod proof_of_work;
pub mod transaction;

pub use audit::{AuditReport, ProofOfAudit};
pub use block::Block;
pub use ledger::{Ledger, LedgerStats};
pub use merkle::{MerkleProof, MerkleTree, ProofElement};
pub use monetary::{
    DEFAULT_AUDIT_THRESHOLD_PERCENT, DEFAULT_BLOCK_REWARD, DEFAULT_DIFFICULTY, GENESIS_MINER,
    MAX_DIFFICULTY, SYSTEM_PRINCIPAL, ZERO_HASH,
};
pub use proof_of_work::ProofOfWork;
pub use transaction::{Transaction, TransactionRequest, TransactionType};
