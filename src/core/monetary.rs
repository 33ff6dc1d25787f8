//! Ledger value constants
//!
//! Values are plain non-negative integers with no sub-unit. The only value
//! created from nothing is the block reward, which the `system` principal
//! pays to the miner of each block.

/// Principal that sends every block reward
pub const SYSTEM_PRINCIPAL: &str = "system";

/// Miner recorded on the genesis block
pub const GENESIS_MINER: &str = "genesis";

/// Sentinel for "no previous block" and "no transactions"
pub const ZERO_HASH: &str = "0";

/// Default reward paid to the miner of each block
pub const DEFAULT_BLOCK_REWARD: u64 = 100;

/// Default number of leading zero hex digits a block hash needs
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Default audit threshold in percent (0.95 of 1.0)
pub const DEFAULT_AUDIT_THRESHOLD_PERCENT: u32 = 95;

/// A SHA-256 hex digest has 64 characters, so no higher difficulty is satisfiable
pub const MAX_DIFFICULTY: u32 = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        const _: () = assert!(DEFAULT_DIFFICULTY <= MAX_DIFFICULTY);
        const _: () = assert!(DEFAULT_AUDIT_THRESHOLD_PERCENT <= 100);
        assert_ne!(SYSTEM_PRINCIPAL, GENESIS_MINER);
        assert_eq!(ZERO_HASH, "0");
    }
}
