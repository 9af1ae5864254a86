use std::collections::HashMap;
use uuid::Uuid;

use crate::models::archive::ArchiveEntry;
use crate::models::balance::SettlementReport;
use crate::models::expense::Expense;
use crate::models::ledger::LedgerState;
use crate::models::participant::Participant;
use crate::models::payment::SettlementPayment;
use crate::models::settings::SettlementModel;

/// Everything a settlement calculation reads. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct SettlementInput<'a> {
    pub participants: &'a [Participant],
    pub expenses: &'a [Expense],
    pub payments: &'a [SettlementPayment],
    pub advances: &'a HashMap<Uuid, f64>,
}

impl<'a> SettlementInput<'a> {
    /// Input for the live (open or pending) period.
    pub fn from_ledger(ledger: &'a LedgerState) -> Self {
        Self {
            participants: &ledger.participants,
            expenses: &ledger.expenses,
            payments: &ledger.payments,
            advances: &ledger.advances,
        }
    }

    /// Input for an archived month, using the roster frozen at closure.
    pub fn from_archive(entry: &'a ArchiveEntry) -> Self {
        Self {
            participants: &entry.participants,
            expenses: &entry.expenses,
            payments: &entry.payments,
            advances: &entry.advances,
        }
    }

    pub fn total_spend(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Equal share per current participant; zero for an empty roster.
    pub fn share(&self) -> f64 {
        if self.participants.is_empty() {
            0.0
        } else {
            self.total_spend() / self.participants.len() as f64
        }
    }

    pub fn paid_by(&self, participant_id: Uuid) -> f64 {
        self.expenses
            .iter()
            .filter(|e| e.payer_id == participant_id)
            .map(|e| e.amount)
            .sum()
    }

    pub fn advance_of(&self, participant_id: Uuid) -> f64 {
        self.advances.get(&participant_id).copied().unwrap_or(0.0)
    }

    /// Total paid from `from` to `to`.
    pub fn sent_between(&self, from: Uuid, to: Uuid) -> f64 {
        self.payments
            .iter()
            .filter(|p| p.from == from && p.to == to)
            .map(|p| p.amount)
            .sum()
    }

    pub fn sent_by(&self, participant_id: Uuid) -> f64 {
        self.payments
            .iter()
            .filter(|p| p.from == participant_id)
            .map(|p| p.amount)
            .sum()
    }

    pub fn received_by(&self, participant_id: Uuid) -> f64 {
        self.payments
            .iter()
            .filter(|p| p.to == participant_id)
            .map(|p| p.amount)
            .sum()
    }

    /// Flagged collector, else the first participant.
    pub fn collector(&self) -> Option<&'a Participant> {
        self.participants
            .iter()
            .find(|p| p.is_collector)
            .or_else(|| self.participants.first())
    }
}

/// A way of turning a period's expenses and payments into balances and debts.
///
/// Implementations must be pure and deterministic: the same input (in any
/// roster order) yields the same set of debts.
pub trait SettlementStrategy: Send + Sync {
    /// Which configured model this strategy implements.
    fn model(&self) -> SettlementModel;

    /// Compute per-participant balances and the resulting debts.
    fn settle(&self, input: &SettlementInput<'_>) -> SettlementReport;
}
