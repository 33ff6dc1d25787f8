//! Utility functions and helpers
//!
//! This module contains the hash primitives, canonical encodings,
//! and the clock used throughout the ledger.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, has_leading_zeros, sha256_digest, sha256_hex};

pub use serialization::{canonical_bytes, to_json_pretty};
