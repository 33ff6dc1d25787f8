//! # Audit Chain - The Evidence Ledger Engine
//!
//! This is the append-only ledger behind the evidence-tracking platform.
//! When I come back to this code, here's what I need to remember:
//!
//! ## What It Does
//! - **Hash-Linked Chain**: every block commits to its predecessor's hash
//! - **Merkle Aggregation**: one root per block over its transaction hashes
//! - **Proof-of-Work**: nonce search until the hash has `difficulty` leading zero hex digits
//! - **Proof-of-Audit**: no block is mined unless the batch's compliance score clears the threshold
//! - **Balances**: arbitrary-precision replay of every confirmed transaction
//! - **Notifications**: typed events for transactions, mined blocks and failures
//!
//! ## How I Organized the Code
//! - `core/`: transactions, blocks, merkle, proof-of-audit, proof-of-work, the ledger
//! - `storage/`: the pool of pending transactions
//! - `notify/`: ledger events and the publish/subscribe notifier
//! - `config/`: defaults, TOML file and environment overrides
//! - `utils/`: hash primitives and canonical encodings
//! - `cli/`: command-line interface for driving a ledger from the shell
//!
//! ## Key Design Decisions
//! - Everything is in memory; callers mirror blocks into durable storage themselves
//! - One `Ledger` handle per process, cloned to every consumer (no globals)
//! - `append` recomputes every invariant instead of trusting the caller
//! - A mining attempt that fails leaves the pool exactly as it found it

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod notify;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::LedgerConfig;
pub use core::{
    AuditReport, Block, Ledger, LedgerStats, MerkleProof, MerkleTree, ProofOfAudit, ProofOfWork,
    Transaction, TransactionRequest, TransactionType,
};
pub use error::{LedgerError, Result};
pub use notify::{LedgerEvent, Notifier};
pub use storage::TransactionPool;
pub use utils::{current_timestamp, sha256_digest, sha256_hex};
