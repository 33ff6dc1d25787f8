//! Configuration management
//!
//! Ledger parameters come from built-in defaults, an optional TOML file, and
//! `AUDIT_CHAIN_*` environment variables, in that order of precedence.
//! They are fixed once a ledger is constructed.

pub mod settings;

pub use settings::LedgerConfig;
