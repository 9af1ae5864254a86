use thiserror::Error;

use crate::models::period::PeriodKey;

/// Unified error type for the entire roomshare-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// None of these are fatal: a rejected operation leaves the ledger exactly
/// as it was, and the caller decides how to surface the message.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / File ──────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Settlement / Archival ───────────────────────────────────────
    #[error("Period {period} is awaiting settlement — record the outstanding payments first")]
    SettlementPending { period: PeriodKey },

    #[error("Period {period} still has {count} outstanding debt(s)")]
    OutstandingDebts { period: PeriodKey, count: usize },

    #[error("Period cannot be closed: {0}")]
    PeriodNotClosable(String),

    // ── Input validation ────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Cannot remove the last remaining participant")]
    LastParticipant,

    // ── Not found ───────────────────────────────────────────────────
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("Archive entry not found: {0}")]
    ArchiveEntryNotFound(String),
}

impl CoreError {
    /// `true` for rejections caused by an unsettled period. These are
    /// user-actionable: recording payments clears them.
    #[must_use]
    pub fn is_blocked_by_settlement(&self) -> bool {
        matches!(
            self,
            CoreError::SettlementPending { .. } | CoreError::OutstandingDebts { .. }
        )
    }

    /// `true` when the operation referenced an id that does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ExpenseNotFound(_)
                | CoreError::PaymentNotFound(_)
                | CoreError::ParticipantNotFound(_)
                | CoreError::ArchiveEntryNotFound(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
