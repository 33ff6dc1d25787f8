//! In-memory buffers
//!
//! The ledger keeps everything in memory; callers that need durability
//! mirror accepted blocks into their own store. This module holds the pool
//! of transactions waiting for the next block.

pub mod memory_pool;

pub use memory_pool::TransactionPool;
