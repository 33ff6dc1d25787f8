// Canonical encodings used for hash preimages and for rendering records
use crate::error::{LedgerError, Result};
use serde::Serialize;

/// Encode data with bincode 2.0 standard configuration through the serde bridge.
///
/// Field order is declaration order, so the output is stable for a given type.
pub fn canonical_bytes<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::serde::encode_to_vec(data, config)
        .map_err(|e| LedgerError::Serialization(format!("Serialization failed: {e}")))
}

/// Render a record as pretty JSON for display
pub fn to_json_pretty<T: Serialize>(data: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}
