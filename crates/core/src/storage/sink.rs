use crate::errors::CoreError;
use crate::models::ledger::LedgerState;

#[cfg(not(target_arch = "wasm32"))]
use super::manager::StorageManager;

/// Where the engine mirrors its state after every change.
///
/// The engine treats this as fire-and-forget: a failing sink is logged and
/// the in-memory state remains authoritative.
pub trait StateSink: Send {
    fn persist(&mut self, state: &LedgerState) -> Result<(), CoreError>;
}

impl<F> StateSink for F
where
    F: FnMut(&LedgerState) -> Result<(), CoreError> + Send,
{
    fn persist(&mut self, state: &LedgerState) -> Result<(), CoreError> {
        self(state)
    }
}

/// Mirrors the ledger as a JSON document on disk.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileSink {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl StateSink for JsonFileSink {
    fn persist(&mut self, state: &LedgerState) -> Result<(), CoreError> {
        StorageManager::save_json_to_file(state, &self.path)
    }
}
