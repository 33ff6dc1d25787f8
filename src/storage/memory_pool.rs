use crate::core::Transaction;
use std::collections::VecDeque;
use std::sync::RwLock;

/// Unconfirmed transactions in submission order
pub struct TransactionPool {
    inner: RwLock<VecDeque<Transaction>>,
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionPool {
    pub fn new() -> TransactionPool {
        TransactionPool {
            inner: RwLock::new(VecDeque::new()),
        }
    }

    pub fn add(&self, tx: Transaction) {
        match self.inner.write() {
            Ok(mut pool) => pool.push_back(tx),
            Err(_) => {
                log::error!("Failed to acquire write lock on transaction pool");
            }
        }
    }

    pub fn get(&self, hash: &str) -> Option<Transaction> {
        match self.inner.read() {
            Ok(pool) => pool.iter().find(|tx| tx.get_hash() == hash).cloned(),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                None
            }
        }
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.get(hash).is_some()
    }

    /// Remove and return the whole buffer in order; the pool is empty afterward
    pub fn drain_all(&self) -> Vec<Transaction> {
        match self.inner.write() {
            Ok(mut pool) => pool.drain(..).collect(),
            Err(_) => {
                log::error!("Failed to acquire write lock on transaction pool");
                Vec::new()
            }
        }
    }

    /// Put a drained batch back in front of anything submitted since, keeping its order
    pub fn restore_front(&self, batch: Vec<Transaction>) {
        match self.inner.write() {
            Ok(mut pool) => {
                for tx in batch.into_iter().rev() {
                    pool.push_front(tx);
                }
            }
            Err(_) => {
                log::error!("Failed to acquire write lock on transaction pool");
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(pool) => pool.len(),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                0
            }
        }
    }

    pub fn get_all(&self) -> Vec<Transaction> {
        match self.inner.read() {
            Ok(pool) => pool.iter().cloned().collect(),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                Vec::new()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.inner.read() {
            Ok(pool) => pool.is_empty(),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                true // Conservative default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TransactionRequest, TransactionType};

    fn tx(label: &str) -> Transaction {
        Transaction::new(TransactionRequest::new(label, "B", 1, TransactionType::Case)).unwrap()
    }

    #[test]
    fn test_add_preserves_order() {
        let pool = TransactionPool::new();
        let (a, b, c) = (tx("a"), tx("b"), tx("c"));
        pool.add(a.clone());
        pool.add(b.clone());
        pool.add(c.clone());

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get_all(), vec![a, b, c]);
    }

    #[test]
    fn test_drain_all_empties_pool() {
        let pool = TransactionPool::new();
        pool.add(tx("a"));
        pool.add(tx("b"));

        let drained = pool.drain_all();
        assert_eq!(drained.len(), 2);
        assert!(pool.is_empty());
        assert!(pool.drain_all().is_empty());
    }

    #[test]
    fn test_restore_front_goes_ahead_of_new_submissions() {
        let pool = TransactionPool::new();
        let (a, b, late) = (tx("a"), tx("b"), tx("late"));
        pool.add(a.clone());
        pool.add(b.clone());

        let batch = pool.drain_all();
        pool.add(late.clone());
        pool.restore_front(batch);

        assert_eq!(pool.get_all(), vec![a, b, late]);
    }

    #[test]
    fn test_lookup_by_hash() {
        let pool = TransactionPool::new();
        let a = tx("a");
        pool.add(a.clone());

        assert!(pool.contains(a.get_hash()));
        assert_eq!(pool.get(a.get_hash()), Some(a));
        assert_eq!(pool.get("missing"), None);
    }
}
