use crate::notify::LedgerEvent;
use log::{info, warn};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// In-process publish/subscribe over `std::sync::mpsc`.
///
/// Each subscriber gets its own unbounded channel, so a slow reader never
/// blocks the ledger.
pub struct Notifier {
    subscribers: Mutex<Vec<Sender<LedgerEvent>>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Notifier {
        Notifier {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Receiver<LedgerEvent> {
        let (sender, receiver) = channel();
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(sender),
            Err(_) => {
                log::error!("Failed to acquire lock on notifier subscribers");
            }
        }
        receiver
    }

    pub fn publish(&self, event: LedgerEvent) {
        if event.is_failure() {
            warn!("{}: {}", event.name(), describe(&event));
        } else {
            info!("{}: {}", event.name(), describe(&event));
        }

        match self.subscribers.lock() {
            // A failed send means the receiver was dropped
            Ok(mut subscribers) => subscribers.retain(|s| s.send(event.clone()).is_ok()),
            Err(_) => {
                log::error!("Failed to acquire lock on notifier subscribers");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        match self.subscribers.lock() {
            Ok(subscribers) => subscribers.len(),
            Err(_) => {
                log::error!("Failed to acquire lock on notifier subscribers");
                0
            }
        }
    }
}

fn describe(event: &LedgerEvent) -> String {
    match event {
        LedgerEvent::TransactionAdded { transaction } => format!(
            "{} {} -> {} ({})",
            transaction.get_type(),
            transaction.get_from(),
            transaction.get_to(),
            transaction.get_hash()
        ),
        LedgerEvent::BlockMined { block } => format!(
            "block {} by {} with {} transactions ({})",
            block.get_block_number(),
            block.get_miner(),
            block.get_transactions().len(),
            block.get_hash()
        ),
        LedgerEvent::ProofOfAuditRejected { score, threshold } => {
            format!("score {score:.4} below threshold {threshold:.2}")
        }
        LedgerEvent::BlockRejected {
            block_number,
            reason,
        }
        | LedgerEvent::ChainValidationFailed {
            block_number,
            reason,
        } => format!("block {block_number}: {reason}"),
    }
}
