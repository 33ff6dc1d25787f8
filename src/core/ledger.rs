// This is the ledger - the single source of truth for the evidence chain
// Everything lives in memory: an append-only Vec of blocks behind a RwLock, the pool of
// pending transactions, and the notifier that tells the outside world what happened
// Callers share one Ledger by cloning the handle; every clone sees the same chain

use crate::config::LedgerConfig;
use crate::core::{
    AuditReport, Block, MerkleProof, ProofOfAudit, ProofOfWork, Transaction, TransactionRequest,
    TransactionType, GENESIS_MINER, SYSTEM_PRINCIPAL, ZERO_HASH,
};
use crate::error::{LedgerError, Result};
use crate::notify::{LedgerEvent, Notifier};
use crate::storage::TransactionPool;
use log::{info, warn};
use num_bigint::{BigInt, BigUint};
use serde::Serialize;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, TryLockError};
use std::thread::{self, JoinHandle};

/// Dashboard-style summary of the ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub block_count: usize,
    pub latest_block_number: u64,
    pub total_transactions: usize,
    pub evidence_transactions: usize,
    pub pending_transactions: usize,
    pub difficulty: u32,
    pub chain_valid: bool,
}

#[derive(Clone)]
pub struct Ledger {
    // Append is the only mutator; a poisoned lock still holds whole blocks only
    blocks: Arc<RwLock<Vec<Block>>>,
    pool: Arc<TransactionPool>,
    notifier: Arc<Notifier>,
    // Held for the whole of a mining attempt so no two attempts see the same batch
    mining: Arc<Mutex<()>>,
    config: Arc<LedgerConfig>,
    audit: ProofOfAudit,
}

impl Ledger {
    // When I start the ledger, the genesis block is the only block that goes in unconditionally
    pub fn new(config: LedgerConfig) -> Result<Ledger> {
        config.validate()?;
        let genesis = Block::generate_genesis_block(config.difficulty);
        info!(
            "Created ledger with genesis block {} (difficulty: {}, reward: {}, audit threshold: {}%)",
            genesis.get_hash(),
            config.difficulty,
            config.block_reward,
            config.audit_threshold_percent
        );

        Ok(Ledger {
            blocks: Arc::new(RwLock::new(vec![genesis])),
            pool: Arc::new(TransactionPool::new()),
            notifier: Arc::new(Notifier::new()),
            mining: Arc::new(Mutex::new(())),
            audit: ProofOfAudit::new(config.audit_threshold_percent),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Register a new subscriber for ledger events
    pub fn subscribe(&self) -> Receiver<LedgerEvent> {
        self.notifier.subscribe()
    }

    fn read_chain(&self) -> RwLockReadGuard<'_, Vec<Block>> {
        self.blocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    // When a caller submits a transaction, I stamp it and queue it for the next block
    // Principals are opaque here - I don't check that the sender exists or can pay
    pub fn submit_transaction(&self, request: TransactionRequest) -> Result<String> {
        // Only the miner's reward may come from the system principal
        if request.from == SYSTEM_PRINCIPAL {
            return Err(LedgerError::Transaction(format!(
                "Transactions from {SYSTEM_PRINCIPAL} are minted by the ledger"
            )));
        }
        let transaction = Transaction::new(request)?;
        let hash = transaction.get_hash().to_string();
        self.pool.add(transaction.clone());
        self.notifier
            .publish(LedgerEvent::TransactionAdded { transaction });
        Ok(hash)
    }

    // This is the whole mining attempt: audit check, nonce search, append
    // If anything fails, the drained batch goes back to the front of the pool untouched
    pub fn mine_block(&self, miner: &str) -> Result<Block> {
        if miner.trim().is_empty() {
            return Err(LedgerError::Transaction(
                "Miner principal must not be empty".to_string(),
            ));
        }

        let _attempt = match self.mining.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(LedgerError::MiningInProgress),
            // A panicked attempt never appended anything, so the guard is still usable
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let batch = self.pool.drain_all();
        match self.mine_batch(miner, &batch) {
            Ok(block) => {
                self.notifier.publish(LedgerEvent::BlockMined {
                    block: block.clone(),
                });
                Ok(block)
            }
            Err(e) => {
                self.pool.restore_front(batch);
                Err(e)
            }
        }
    }

    fn mine_batch(&self, miner: &str, batch: &[Transaction]) -> Result<Block> {
        // The audit gate runs once, before any hashing
        let report = match self.audit.check(batch) {
            Ok(report) => report,
            Err(e) => {
                if let LedgerError::ProofOfAudit { score, threshold } = e {
                    self.notifier
                        .publish(LedgerEvent::ProofOfAuditRejected { score, threshold });
                }
                return Err(e);
            }
        };

        let (tip_number, tip_hash) = {
            let blocks = self.read_chain();
            let tip = blocks
                .last()
                .ok_or_else(|| LedgerError::integrity(0, "chain has no genesis block"))?;
            (tip.get_block_number(), tip.get_hash().to_string())
        };

        let mut transactions = batch.to_vec();
        transactions.push(Transaction::new_reward(
            miner,
            self.config.block_reward,
            &report,
        )?);

        info!(
            "Mining block {} with {} transactions for {miner} (compliance score: {:.4})",
            tip_number + 1,
            transactions.len(),
            report.compliance_score
        );

        let block = Block::new_block(
            tip_hash,
            transactions,
            tip_number + 1,
            self.config.difficulty,
            miner,
        )?;
        self.append(block.clone())?;
        Ok(block)
    }

    /// Run `mine_block` on a dedicated thread so submissions and reads stay responsive
    pub fn spawn_mining(&self, miner: &str) -> Result<JoinHandle<Result<Block>>> {
        let ledger = self.clone();
        let miner = miner.to_string();
        let handle = thread::Builder::new()
            .name("audit-chain-miner".to_string())
            .spawn(move || ledger.mine_block(&miner))?;
        Ok(handle)
    }

    // I never trust a block handed to me - every invariant is recomputed from its own fields
    pub fn append(&self, block: Block) -> Result<()> {
        let block_number = block.get_block_number();
        let hash = block.get_hash().to_string();

        let result = {
            let mut blocks = self.blocks.write().unwrap_or_else(PoisonError::into_inner);
            let checked = match blocks.last() {
                Some(previous) => self.verify_successor(&block, previous),
                None => Err(LedgerError::integrity(0, "chain has no genesis block")),
            };
            checked.map(|()| blocks.push(block))
        };

        match result {
            Ok(()) => {
                info!("Appended block {block_number}: {hash}");
                Ok(())
            }
            Err(e) => {
                let reason = match &e {
                    LedgerError::ChainIntegrity { reason, .. } => reason.clone(),
                    other => other.to_string(),
                };
                self.notifier.publish(LedgerEvent::BlockRejected {
                    block_number,
                    reason,
                });
                Err(e)
            }
        }
    }

    fn verify_genesis(&self, block: &Block) -> Result<()> {
        let fail = |reason: &str| -> Result<()> { Err(LedgerError::integrity(0, reason)) };

        if block.get_block_number() != 0 {
            return fail("first block is not numbered 0");
        }
        if block.get_previous_hash() != ZERO_HASH {
            return fail("genesis previous hash is not the zero sentinel");
        }
        if !block.get_transactions().is_empty() || block.get_merkle_root() != ZERO_HASH {
            return fail("genesis block carries transactions");
        }
        if block.get_miner() != GENESIS_MINER {
            return fail("genesis miner is not the genesis sentinel");
        }
        if block.get_difficulty() != self.config.difficulty {
            return fail("genesis difficulty differs from the ledger difficulty");
        }
        if block.calculate_hash() != block.get_hash() {
            return fail("genesis hash does not match its header");
        }
        Ok(())
    }

    fn verify_successor(&self, block: &Block, previous: &Block) -> Result<()> {
        let number = block.get_block_number();
        let fail = |reason: String| -> Result<()> { Err(LedgerError::integrity(number, reason)) };

        if Some(number) != previous.get_block_number().checked_add(1) {
            return fail(format!(
                "block number {number} does not follow {}",
                previous.get_block_number()
            ));
        }
        if block.get_previous_hash() != previous.get_hash() {
            return fail(format!(
                "previous hash {} does not match block {} hash {}",
                block.get_previous_hash(),
                previous.get_block_number(),
                previous.get_hash()
            ));
        }
        if block.get_difficulty() != self.config.difficulty {
            return fail(format!(
                "difficulty {} differs from the ledger difficulty {}",
                block.get_difficulty(),
                self.config.difficulty
            ));
        }
        if !block.verify_transaction_hashes() {
            return fail("a transaction hash does not match its contents".to_string());
        }
        if !block.verify_merkle_root() {
            return fail("merkle root does not match the transactions".to_string());
        }
        // Difficulty already matches the ledger's, so the block's own target is the ledger's
        if !ProofOfWork::validate(block) {
            return fail(format!(
                "hash {} does not match its header or has fewer than {} leading zeros",
                block.get_hash(),
                self.config.difficulty
            ));
        }
        let reward = self.verify_reward(block)?;

        let transactions = block.get_transactions();
        let batch = &transactions[..transactions.len() - 1];
        let report = AuditReport::evaluate(batch);
        if !self.audit.passes(&report) {
            return fail(format!(
                "compliance score {:.4} below threshold {:.2}",
                report.compliance_score,
                self.audit.threshold()
            ));
        }
        // The recorded report has to be the one the batch actually produces
        if serde_json::to_value(&report)? != *reward.get_data() {
            return fail(
                "reward carries an audit report that does not match the batch".to_string(),
            );
        }

        Ok(())
    }

    // Exactly one reward, last in the block, paying the configured amount to the block's miner
    fn verify_reward<'b>(&self, block: &'b Block) -> Result<&'b Transaction> {
        let number = block.get_block_number();
        let fail = |reason: &str| -> Result<&'b Transaction> {
            Err(LedgerError::integrity(number, reason))
        };

        let reward = match block.get_reward() {
            Some(reward) => reward,
            None => return fail("block does not end with a reward transaction"),
        };
        let reward_count = block
            .get_transactions()
            .iter()
            .filter(|tx| tx.is_reward())
            .count();
        if reward_count != 1 {
            return fail("block carries more than one reward transaction");
        }
        if reward.get_to() != block.get_miner() {
            return fail("reward is not paid to the block's miner");
        }
        if reward.get_type() != TransactionType::Audit {
            return fail("reward is not tagged audit");
        }
        if reward.get_value() != &BigUint::from(self.config.block_reward) {
            return fail("reward value differs from the ledger block reward");
        }
        Ok(reward)
    }

    /// Re-walk the whole chain and report the first block that breaks an invariant
    pub fn verify_chain(&self) -> Result<()> {
        let result = {
            let blocks = self.read_chain();
            match blocks.first() {
                None => Err(LedgerError::integrity(0, "chain has no genesis block")),
                Some(genesis) => self.verify_genesis(genesis).and_then(|()| {
                    blocks
                        .windows(2)
                        .try_for_each(|pair| self.verify_successor(&pair[1], &pair[0]))
                }),
            }
        };

        if let Err(LedgerError::ChainIntegrity {
            block_number,
            reason,
        }) = &result
        {
            self.notifier.publish(LedgerEvent::ChainValidationFailed {
                block_number: *block_number,
                reason: reason.clone(),
            });
        }
        result
    }

    pub fn validate_chain(&self) -> bool {
        self.verify_chain().is_ok()
    }

    // I replay every transaction ever confirmed; BigInt so nothing wraps on a long-lived chain
    // There is no overdraft check, so a balance can go negative ("system" always is)
    pub fn balance_of(&self, principal: &str) -> BigInt {
        let blocks = self.read_chain();
        let mut balance = BigInt::from(0);
        for tx in blocks.iter().flat_map(|block| block.get_transactions()) {
            if tx.get_from() == principal {
                balance -= BigInt::from(tx.get_value().clone());
            }
            if tx.get_to() == principal {
                balance += BigInt::from(tx.get_value().clone());
            }
        }
        balance
    }

    /// Blocks are numbered by position, so this is a direct index
    pub fn block_by_number(&self, block_number: u64) -> Option<Block> {
        let index = usize::try_from(block_number).ok()?;
        self.read_chain()
            .get(index)
            .filter(|block| block.get_block_number() == block_number)
            .cloned()
    }

    /// Look a transaction up in the chain first, then among pending transactions
    pub fn transaction_by_hash(&self, hash: &str) -> Option<Transaction> {
        let confirmed = self
            .read_chain()
            .iter()
            .flat_map(|block| block.get_transactions())
            .find(|tx| tx.get_hash() == hash)
            .cloned();
        confirmed.or_else(|| self.pool.get(hash))
    }

    /// Inclusion proof for a confirmed transaction, with the number of its block
    pub fn transaction_proof(&self, hash: &str) -> Option<(u64, MerkleProof)> {
        let blocks = self.read_chain();
        blocks.iter().find_map(|block| {
            let index = block
                .get_transactions()
                .iter()
                .position(|tx| tx.get_hash() == hash)?;
            match block.generate_merkle_proof(index) {
                Ok(proof) => Some((block.get_block_number(), proof)),
                Err(e) => {
                    warn!("Failed to build merkle proof for {hash}: {e}");
                    None
                }
            }
        })
    }

    /// Every confirmed transaction sent or received by `principal`, in chain order
    pub fn transactions_for(&self, principal: &str) -> Vec<Transaction> {
        self.read_chain()
            .iter()
            .flat_map(|block| block.get_transactions())
            .filter(|tx| tx.involves(principal))
            .cloned()
            .collect()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.pool.get_all()
    }

    /// What the proof-of-audit gate would say about the current pool
    pub fn audit_pending(&self) -> AuditReport {
        AuditReport::evaluate(&self.pool.get_all())
    }

    /// Point-in-time copy of the whole chain
    pub fn blocks(&self) -> Vec<Block> {
        self.read_chain().clone()
    }

    pub fn latest_block(&self) -> Option<Block> {
        self.read_chain().last().cloned()
    }

    pub fn block_count(&self) -> usize {
        self.read_chain().len()
    }

    // Note: this walks the whole chain through verify_chain, so it costs O(total transactions)
    pub fn stats(&self) -> LedgerStats {
        let (block_count, total_transactions, evidence_transactions) = {
            let blocks = self.read_chain();
            let transactions = blocks.iter().flat_map(|block| block.get_transactions());
            let (total, evidence) = transactions.fold((0, 0), |(total, evidence), tx| {
                let is_evidence = tx.get_type() == TransactionType::Evidence;
                (total + 1, evidence + usize::from(is_evidence))
            });
            (blocks.len(), total, evidence)
        };

        LedgerStats {
            block_count,
            latest_block_number: block_count.saturating_sub(1) as u64,
            total_transactions,
            evidence_transactions,
            pending_transactions: self.pool.len(),
            difficulty: self.config.difficulty,
            chain_valid: self.validate_chain(),
        }
    }

    // Test-only access to the stored chain for tampering scenarios
    #[cfg(test)]
    pub(crate) fn with_chain_mut<R>(&self, f: impl FnOnce(&mut Vec<Block>) -> R) -> R {
        let mut blocks = self.blocks.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut blocks)
    }
}
