//! Test fixtures for ledger testing
//!
//! Fast ledgers (difficulty 1) and builders for evidence and audit batches
//! that do or do not clear the proof-of-audit gate.

pub mod test_utils;

pub use test_utils::*;
