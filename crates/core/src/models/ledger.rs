use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::archive::{ArchiveEntry, PeriodState};
use super::expense::Expense;
use super::participant::Participant;
use super::payment::SettlementPayment;
use super::period::PeriodKey;
use super::settings::Settings;

/// The whole engine state. This is the single document the persistence
/// layer mirrors (JSON or binary snapshot).
///
/// `expenses`, `payments` and `advances` always belong to `current_period`;
/// closing the period moves them into `archive`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    pub participants: Vec<Participant>,

    /// Period the live expenses belong to
    pub current_period: PeriodKey,

    pub expenses: Vec<Expense>,

    pub payments: Vec<SettlementPayment>,

    /// Manual advances per participant (peer settlement only)
    #[serde(default)]
    pub advances: HashMap<Uuid, f64>,

    /// Closed months, oldest first
    #[serde(default)]
    pub archive: Vec<ArchiveEntry>,

    /// Idempotence key: the most recent period that was archived
    #[serde(default)]
    pub last_archived_period: Option<PeriodKey>,

    /// Ended period that still has debts
    #[serde(default)]
    pub pending_period: Option<PeriodKey>,

    #[serde(default)]
    pub settings: Settings,
}

impl LedgerState {
    /// Empty ledger opened at `period`.
    pub fn new(current_period: PeriodKey) -> Self {
        Self {
            participants: Vec::new(),
            current_period,
            expenses: Vec::new(),
            payments: Vec::new(),
            advances: HashMap::new(),
            archive: Vec::new(),
            last_archived_period: None,
            pending_period: None,
            settings: Settings::default(),
        }
    }

    /// The designated collector. Falls back to the first participant if no flag is set
    /// (documents written by older versions); `None` only for an empty roster.
    pub fn collector(&self) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.is_collector)
            .or_else(|| self.participants.first())
    }

    pub fn participant(&self, id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn payment(&self, id: Uuid) -> Option<&SettlementPayment> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn archive_entry(&self, period: PeriodKey) -> Option<&ArchiveEntry> {
        self.archive.iter().find(|a| a.period == period)
    }

    pub fn is_archived(&self, period: PeriodKey) -> bool {
        self.last_archived_period == Some(period) || self.archive_entry(period).is_some()
    }

    pub fn period_state(&self) -> PeriodState {
        match self.pending_period {
            Some(p) => PeriodState::PendingSettlement(p),
            None => PeriodState::Open(self.current_period),
        }
    }

    /// The period that blocks new spending, if any: the pending one, or else
    /// the oldest archived month still flagged unsettled.
    pub fn blocking_period(&self) -> Option<PeriodKey> {
        self.pending_period.or_else(|| {
            self.archive
                .iter()
                .filter(|a| !a.settled)
                .map(|a| a.period)
                .min()
        })
    }

    pub fn total_spend(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }
}
