use crate::core::{Transaction, TransactionType};
use crate::error::{LedgerError, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// The compliance evaluation of one candidate batch.
///
/// A copy of this report is written into the reward transaction of every
/// mined block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub evidence_count: usize,
    pub verified_evidence_count: usize,
    pub audit_count: usize,
    /// Verified evidence over all evidence, `1.0` when there is no evidence
    pub verification_rate: f64,
    /// At least as many audit transactions as evidence transactions
    pub audit_trail_complete: bool,
    /// Mean of `verification_rate` and `audit_trail_complete` as `0.0`/`1.0`
    pub compliance_score: f64,
}

impl AuditReport {
    pub fn evaluate(transactions: &[Transaction]) -> AuditReport {
        let mut evidence_count = 0;
        let mut verified_evidence_count = 0;
        let mut audit_count = 0;

        for tx in transactions {
            match tx.get_type() {
                TransactionType::Evidence => {
                    evidence_count += 1;
                    if tx.is_verified_evidence() {
                        verified_evidence_count += 1;
                    }
                }
                TransactionType::Audit => audit_count += 1,
                _ => {}
            }
        }

        let verification_rate = if evidence_count == 0 {
            1.0
        } else {
            verified_evidence_count as f64 / evidence_count as f64
        };
        let audit_trail_complete = audit_count >= evidence_count;
        let compliance_score =
            (verification_rate + if audit_trail_complete { 1.0 } else { 0.0 }) / 2.0;

        AuditReport {
            evidence_count,
            verified_evidence_count,
            audit_count,
            verification_rate,
            audit_trail_complete,
            compliance_score,
        }
    }
}

/// Consensus predicate run before any nonce search: hash power alone does
/// not mint a block, the batch must also carry enough compliance evidence.
#[derive(Debug, Clone, Copy)]
pub struct ProofOfAudit {
    threshold_percent: u32,
}

impl ProofOfAudit {
    pub fn new(threshold_percent: u32) -> ProofOfAudit {
        ProofOfAudit { threshold_percent }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold_percent as f64 / 100.0
    }

    pub fn threshold_percent(&self) -> u32 {
        self.threshold_percent
    }

    /// Exact threshold comparison.
    ///
    /// `(verified / evidence + complete) / 2 >= pct / 100` is cross-multiplied
    /// into integers so a score sitting exactly on the threshold is never lost
    /// to float rounding.
    pub fn passes(&self, report: &AuditReport) -> bool {
        let evidence = report.evidence_count as u128;
        let verified = report.verified_evidence_count as u128;
        let complete = u128::from(report.audit_trail_complete);
        let pct = self.threshold_percent as u128;

        if evidence == 0 {
            // verification rate is 1.0 and the trail is trivially complete
            return pct <= 100;
        }
        100 * (verified + complete * evidence) >= 2 * pct * evidence
    }

    /// Evaluate a batch and fail with `LedgerError::ProofOfAudit` when it falls short
    pub fn check(&self, transactions: &[Transaction]) -> Result<AuditReport> {
        let report = AuditReport::evaluate(transactions);
        if self.passes(&report) {
            Ok(report)
        } else {
            warn!(
                "Proof-of-audit failed: score {:.4} < {:.2} ({} evidence, {} verified, {} audit)",
                report.compliance_score,
                self.threshold(),
                report.evidence_count,
                report.verified_evidence_count,
                report.audit_count
            );
            Err(LedgerError::ProofOfAudit {
                score: report.compliance_score,
                threshold: self.threshold(),
            })
        }
    }
}
