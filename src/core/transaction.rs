// This file implements the ledger's transaction record - the unit of work the pool buffers
// Transactions are immutable once created: every field goes into the hash, so any edit
// after the fact is visible to chain validation

use crate::core::audit::AuditReport;
use crate::core::SYSTEM_PRINCIPAL;
use crate::error::{LedgerError, Result};
use crate::utils::{canonical_bytes, current_timestamp, sha256_hex};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// The key an evidence payload uses to name the principal who verified it
const VERIFIED_BY_KEY: &str = "verifiedBy";

/// Closed set of domain tags; proof-of-audit only looks at `Evidence` and `Audit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Evidence,
    Property,
    Case,
    Contract,
    Audit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Evidence => "evidence",
            TransactionType::Property => "property",
            TransactionType::Case => "case",
            TransactionType::Contract => "contract",
            TransactionType::Audit => "audit",
        }
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "evidence" => Ok(TransactionType::Evidence),
            "property" => Ok(TransactionType::Property),
            "case" => Ok(TransactionType::Case),
            "contract" => Ok(TransactionType::Contract),
            "audit" => Ok(TransactionType::Audit),
            _ => Err(LedgerError::Transaction(format!(
                "Invalid transaction type: {s}. Valid options: evidence, property, case, contract, audit"
            ))),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller-supplied fields of a transaction, before the ledger stamps it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    #[serde(with = "decimal")]
    pub value: BigUint,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    #[serde(default)]
    pub data: Value,
    #[serde(default, rename = "gasPrice")]
    pub gas_price: Option<u64>,
    #[serde(default, rename = "gasUsed")]
    pub gas_used: Option<u64>,
}

impl TransactionRequest {
    pub fn new(from: &str, to: &str, value: u64, tx_type: TransactionType) -> Self {
        TransactionRequest {
            from: from.to_string(),
            to: to.to_string(),
            value: BigUint::from(value),
            tx_type,
            data: Value::Null,
            gas_price: None,
            gas_used: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_gas(mut self, gas_price: u64, gas_used: u64) -> Self {
        self.gas_price = Some(gas_price);
        self.gas_used = Some(gas_used);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    hash: String,
    from: String,
    to: String,
    #[serde(with = "decimal")]
    value: BigUint,
    #[serde(rename = "gasPrice")]
    gas_price: Option<u64>,
    #[serde(rename = "gasUsed")]
    gas_used: Option<u64>,
    #[serde(rename = "type")]
    tx_type: TransactionType,
    data: Value,
    timestamp: i64,
    salt: Uuid,
}

// Borrowed view of everything the transaction hash covers, in a fixed order
#[derive(Serialize)]
struct TransactionPreimage<'a> {
    from: &'a str,
    to: &'a str,
    value: String,
    gas_price: Option<u64>,
    gas_used: Option<u64>,
    tx_type: &'static str,
    data: String,
    timestamp: i64,
    salt: [u8; 16],
}

impl Transaction {
    // When a caller submits a transaction, I stamp it with the creation time and a random salt
    // The salt keeps identical payloads submitted in the same millisecond apart
    pub fn new(request: TransactionRequest) -> Result<Transaction> {
        if request.from.trim().is_empty() {
            return Err(LedgerError::Transaction(
                "Sender principal must not be empty".to_string(),
            ));
        }
        if request.to.trim().is_empty() {
            return Err(LedgerError::Transaction(
                "Recipient principal must not be empty".to_string(),
            ));
        }

        let mut tx = Transaction {
            hash: String::new(),
            from: request.from,
            to: request.to,
            value: request.value,
            gas_price: request.gas_price,
            gas_used: request.gas_used,
            tx_type: request.tx_type,
            data: request.data,
            timestamp: current_timestamp()?,
            salt: Uuid::new_v4(),
        };
        tx.hash = tx.calculate_hash()?;
        Ok(tx)
    }

    // The miner's reward: value created from nothing, paid by the system principal
    // The audit report rides along in the payload so the audit itself is auditable
    pub fn new_reward(miner: &str, reward: u64, report: &AuditReport) -> Result<Transaction> {
        let request = TransactionRequest::new(SYSTEM_PRINCIPAL, miner, reward, TransactionType::Audit)
            .with_data(serde_json::to_value(report)?);
        Transaction::new(request)
    }

    /// Recompute the hash from the stored fields
    pub fn calculate_hash(&self) -> Result<String> {
        let preimage = TransactionPreimage {
            from: &self.from,
            to: &self.to,
            value: self.value.to_str_radix(10),
            gas_price: self.gas_price,
            gas_used: self.gas_used,
            tx_type: self.tx_type.as_str(),
            data: serde_json::to_string(&self.data)?,
            timestamp: self.timestamp,
            salt: *self.salt.as_bytes(),
        };
        Ok(sha256_hex(&canonical_bytes(&preimage)?))
    }

    /// True when the stored hash still matches the stored fields
    pub fn verify_hash(&self) -> bool {
        match self.calculate_hash() {
            Ok(hash) => hash == self.hash,
            Err(e) => {
                log::error!("Failed to recompute transaction hash: {e}");
                false
            }
        }
    }

    pub fn is_reward(&self) -> bool {
        self.from == SYSTEM_PRINCIPAL
    }

    /// An evidence transaction counts as verified when its payload names a verifier
    pub fn is_verified_evidence(&self) -> bool {
        self.tx_type == TransactionType::Evidence
            && self
                .data
                .get(VERIFIED_BY_KEY)
                .and_then(Value::as_str)
                .is_some_and(|verifier| !verifier.trim().is_empty())
    }

    pub fn involves(&self, principal: &str) -> bool {
        self.from == principal || self.to == principal
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn get_from(&self) -> &str {
        self.from.as_str()
    }

    pub fn get_to(&self) -> &str {
        self.to.as_str()
    }

    pub fn get_value(&self) -> &BigUint {
        &self.value
    }

    pub fn get_gas_price(&self) -> Option<u64> {
        self.gas_price
    }

    pub fn get_gas_used(&self) -> Option<u64> {
        self.gas_used
    }

    pub fn get_type(&self) -> TransactionType {
        self.tx_type
    }

    pub fn get_data(&self) -> &Value {
        &self.data
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    #[cfg(test)]
    pub(crate) fn value_mut(&mut self) -> &mut BigUint {
        &mut self.value
    }

    #[cfg(test)]
    pub(crate) fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    #[cfg(test)]
    pub(crate) fn set_gas(&mut self, gas_price: Option<u64>, gas_used: Option<u64>) {
        self.gas_price = gas_price;
        self.gas_used = gas_used;
    }
}

// BigUint travels as a decimal string; plain JSON numbers are accepted on input
mod decimal {
    use num_bigint::BigUint;
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        struct DecimalVisitor;

        impl<'de> Visitor<'de> for DecimalVisitor {
            type Value = BigUint;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a non-negative integer or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigUint, E> {
                Ok(BigUint::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigUint, E> {
                u64::try_from(v)
                    .map(BigUint::from)
                    .map_err(|_| E::custom(format!("value must be non-negative, got {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<BigUint, E> {
                BigUint::from_str(v.trim())
                    .map_err(|e| E::custom(format!("invalid decimal value {v:?}: {e}")))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}
