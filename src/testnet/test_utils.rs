//! Test utilities for ledger testing

use crate::config::LedgerConfig;
use crate::core::{Ledger, TransactionRequest, TransactionType};
use serde_json::json;

pub const TEST_BLOCK_REWARD: u64 = 100;

/// Easy difficulty for fast testing
pub fn test_config() -> LedgerConfig {
    LedgerConfig {
        difficulty: 1,
        block_reward: TEST_BLOCK_REWARD,
        audit_threshold_percent: 95,
        ..LedgerConfig::default()
    }
}

pub fn create_test_ledger() -> Ledger {
    Ledger::new(test_config()).expect("test config is valid")
}

/// An evidence submission from `principal`, optionally naming a verifier
pub fn evidence_request(principal: &str, verified: bool) -> TransactionRequest {
    let mut data = json!({"evidenceHash": format!("sha256:{principal}-exhibit")});
    if verified {
        data["verifiedBy"] = json!("forensics-lab");
    }
    TransactionRequest::new(principal, "evidence-vault", 0, TransactionType::Evidence)
        .with_data(data)
}

pub fn audit_request(principal: &str) -> TransactionRequest {
    TransactionRequest::new("auditor", principal, 0, TransactionType::Audit)
        .with_data(json!({"action": "reviewed"}))
}

/// Submit `count` verified evidence transactions followed by `count` audits.
/// Returns the hashes in submission order.
pub fn submit_compliant_batch(ledger: &Ledger, principal: &str, count: usize) -> Vec<String> {
    let evidence = (0..count).map(|_| evidence_request(principal, true));
    let audits = (0..count).map(|_| audit_request(principal));
    evidence
        .chain(audits)
        .map(|request| {
            ledger
                .submit_transaction(request)
                .expect("fixture transactions are well formed")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_ledger() {
        let ledger = create_test_ledger();
        assert_eq!(ledger.block_count(), 1);
        assert_eq!(ledger.config().difficulty, 1);
    }

    #[test]
    fn test_compliant_batch_passes_audit() {
        let ledger = create_test_ledger();
        let hashes = submit_compliant_batch(&ledger, "A", 3);
        assert_eq!(hashes.len(), 6);
        assert_eq!(ledger.audit_pending().compliance_score, 1.0);
    }

    #[test]
    fn test_unverified_evidence_request() {
        let request = evidence_request("A", false);
        assert!(request.data.get("verifiedBy").is_none());
        assert_eq!(request.tx_type, TransactionType::Evidence);
    }
}
