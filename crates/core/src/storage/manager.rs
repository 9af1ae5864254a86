use crate::errors::CoreError;
use crate::models::ledger::LedgerState;

use super::format;

/// Save/load of the ledger document, as JSON or as a framed binary snapshot.
pub struct StorageManager;

impl StorageManager {
    /// Pretty-printed JSON document (camelCase fields, ISO-8601 dates).
    pub fn to_json(state: &LedgerState) -> Result<String, CoreError> {
        serde_json::to_string_pretty(state)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger to JSON: {e}")))
    }

    pub fn from_json(json: &str) -> Result<LedgerState, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::Deserialization(format!("Failed to parse ledger JSON: {e}")))
    }

    /// Compact binary snapshot.
    ///
    /// Flow: LedgerState → bincode → RMSH frame
    pub fn save_to_bytes(state: &LedgerState) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(state)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Flow: RMSH frame → header check → bincode → LedgerState
    pub fn load_from_bytes(data: &[u8]) -> Result<LedgerState, CoreError> {
        let (_header, payload) = format::read_file(data)?;
        bincode::deserialize(payload)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize ledger: {e}")))
    }

    /// Write a binary snapshot to disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(state: &LedgerState, path: &str) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(state)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a binary snapshot from disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str) -> Result<LedgerState, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes)
    }

    /// Write the JSON document to disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_json_to_file(state: &LedgerState, path: &str) -> Result<(), CoreError> {
        let json = Self::to_json(state)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read the JSON document from disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_json_from_file(path: &str) -> Result<LedgerState, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
