use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::balance::{Balance, Debt};
use super::expense::Expense;
use super::participant::Participant;
use super::payment::SettlementPayment;
use super::period::PeriodKey;

/// Frozen record of a closed month.
///
/// Created exactly once per period. After creation only `settled` may change,
/// and the whole entry may be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    #[serde(rename = "periodKey")]
    pub period: PeriodKey,

    /// Roster as it stood at closure; shares of this month are divided by its size.
    pub participants: Vec<Participant>,

    pub expenses: Vec<Expense>,

    pub payments: Vec<SettlementPayment>,

    #[serde(default)]
    pub advances: HashMap<Uuid, f64>,

    pub total_spend: f64,

    #[serde(default)]
    pub final_balances: Vec<Balance>,

    pub final_debts: Vec<Debt>,

    #[serde(rename = "settledFlag")]
    pub settled: bool,

    pub archived_at: DateTime<Utc>,
}

/// Where the live ledger stands in the month-close state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodState {
    /// Expenses for this period are being recorded normally.
    Open(PeriodKey),
    /// The period has ended but debts remain; spending is blocked until they clear.
    PendingSettlement(PeriodKey),
}

impl PeriodState {
    pub fn period(&self) -> PeriodKey {
        match self {
            PeriodState::Open(p) | PeriodState::PendingSettlement(p) => *p,
        }
    }
}

/// Result of one rollover evaluation or manual close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Nothing to do.
    Unchanged,
    /// The stored period moved forward without archiving (the old one was already archived).
    Advanced { from: PeriodKey, to: PeriodKey },
    /// The ended period has debts; spending is now blocked.
    Pending(PeriodKey),
    /// The period was archived and the live ledger cleared.
    Closed(PeriodKey),
}

impl ArchiveOutcome {
    /// Did the evaluation change the ledger?
    pub fn changed_state(&self) -> bool {
        !matches!(self, ArchiveOutcome::Unchanged)
    }
}
