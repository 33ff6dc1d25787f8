//! Error handling for the ledger engine
//!
//! Every fallible ledger operation returns [`Result`]. Lookups that find
//! nothing are not errors and return `Option::None` instead.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// The candidate batch's compliance score fell below the audit threshold
    ProofOfAudit { score: f64, threshold: f64 },
    /// A block failed invariant re-derivation
    ChainIntegrity { block_number: u64, reason: String },
    /// Another mining attempt already owns the pool
    MiningInProgress,
    /// Malformed transaction submission
    Transaction(String),
    /// Configuration errors
    Config(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// System clock errors
    Clock(String),
}

impl LedgerError {
    pub fn integrity(block_number: u64, reason: impl Into<String>) -> Self {
        LedgerError::ChainIntegrity {
            block_number,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::ProofOfAudit { score, threshold } => write!(
                f,
                "Proof-of-audit rejected: compliance score {score:.4} below threshold {threshold:.2}"
            ),
            LedgerError::ChainIntegrity {
                block_number,
                reason,
            } => write!(f, "Chain integrity error at block {block_number}: {reason}"),
            LedgerError::MiningInProgress => {
                write!(f, "Mining error: another mining attempt is in progress")
            }
            LedgerError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::Clock(msg) => write!(f, "Clock error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LedgerError {
    fn from(err: toml::ser::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}
