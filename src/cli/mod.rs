//! Command-line interface
//!
//! This module contains the CLI commands and argument parsing
//! for driving a ledger from the shell.

pub mod commands;

pub use commands::{Command, Opt};
