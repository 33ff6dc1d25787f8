use crate::core::{Block, Transaction};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum LedgerEvent {
    /// A transaction entered the pool
    TransactionAdded { transaction: Transaction },
    /// A block was mined and appended to the chain
    BlockMined { block: Block },
    /// A mining attempt was refused before the nonce search
    ProofOfAuditRejected { score: f64, threshold: f64 },
    /// `append` refused a block; the block was discarded
    BlockRejected { block_number: u64, reason: String },
    /// `validate_chain` found a block that no longer satisfies the invariants
    ChainValidationFailed { block_number: u64, reason: String },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::TransactionAdded { .. } => "transactionAdded",
            LedgerEvent::BlockMined { .. } => "blockMined",
            LedgerEvent::ProofOfAuditRejected { .. } => "proofOfAuditRejected",
            LedgerEvent::BlockRejected { .. } => "blockRejected",
            LedgerEvent::ChainValidationFailed { .. } => "chainValidationFailed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LedgerEvent::ProofOfAuditRejected { .. }
                | LedgerEvent::BlockRejected { .. }
                | LedgerEvent::ChainValidationFailed { .. }
        )
    }
}
