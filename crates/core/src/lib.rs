pub mod errors;
pub mod models;
pub mod services;
pub mod settlement;
pub mod storage;
#[cfg(not(target_arch = "wasm32"))]
pub mod watcher;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use errors::CoreError;
use models::{
    analytics::PeriodSummary,
    archive::{ArchiveEntry, ArchiveOutcome, PeriodState},
    balance::{Balance, Debt, SettlementReport},
    expense::{Category, Expense, ExpenseSortOrder, ExpenseUpdate},
    ledger::LedgerState,
    participant::Participant,
    payment::SettlementPayment,
    period::PeriodKey,
    settings::{RetentionPolicy, SettlementModel, Settings},
};
use services::{
    analytics_service::AnalyticsService, archive_service::ArchiveService,
    clock_service::PeriodClock, ledger_service::LedgerService, roster_service::RosterService,
};
use settlement::traits::{SettlementInput, SettlementStrategy};
use storage::{manager::StorageManager, sink::StateSink};

/// Upper bound for the rollover polling interval: a month change must be
/// noticed within a minute.
const MAX_POLL_INTERVAL_SECS: u64 = 60;

/// Name of the collector seeded by `reset_all_data`.
pub const DEFAULT_COLLECTOR_NAME: &str = "Admin User";

/// Main entry point for the RoomShare core library.
///
/// Owns the whole ledger and every service operating on it. All commands run
/// to completion on `&mut self`; the period clock is consulted on every
/// mutation, so a month rollover is applied before the command itself.
#[must_use]
pub struct RoomShare {
    ledger: LedgerState,
    clock: PeriodClock,
    strategy: Box<dyn SettlementStrategy>,
    ledger_service: LedgerService,
    roster_service: RosterService,
    archive_service: ArchiveService,
    analytics_service: AnalyticsService,
    sink: Option<Box<dyn StateSink>>,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for RoomShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomShare")
            .field("period", &self.ledger.period_state())
            .field("participants", &self.ledger.participants.len())
            .field("expenses", &self.ledger.expenses.len())
            .field("payments", &self.ledger.payments.len())
            .field("archived", &self.ledger.archive.len())
            .field("model", &self.strategy.model())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl RoomShare {
    /// Create a brand new empty ledger opened at the current month.
    pub fn create_new() -> Self {
        Self::create_with_clock(PeriodClock::new())
    }

    /// Create an empty ledger whose notion of "now" comes from `clock`.
    pub fn create_with_clock(clock: PeriodClock) -> Self {
        let ledger = LedgerState::new(clock.current_period());
        Self::build(ledger, clock)
    }

    /// Wrap an existing document (e.g. loaded by the host). The rollover check
    /// runs on the next command or `tick()`.
    pub fn from_state(state: LedgerState) -> Self {
        Self::build(state, PeriodClock::new())
    }

    pub fn from_state_with_clock(state: LedgerState, clock: PeriodClock) -> Self {
        Self::build(state, clock)
    }

    /// Load from the JSON document.
    pub fn load_from_json(json: &str) -> Result<Self, CoreError> {
        Ok(Self::from_state(StorageManager::from_json(json)?))
    }

    /// Load from a binary snapshot.
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, CoreError> {
        Ok(Self::from_state(StorageManager::load_from_bytes(data)?))
    }

    /// Serialize to the JSON document. Clears the unsaved-changes flag.
    pub fn save_to_json(&mut self) -> Result<String, CoreError> {
        let json = StorageManager::to_json(&self.ledger)?;
        self.dirty = false;
        Ok(json)
    }

    /// Serialize to a binary snapshot. Clears the unsaved-changes flag.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.ledger)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load a binary snapshot from disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str) -> Result<Self, CoreError> {
        Ok(Self::from_state(StorageManager::load_from_file(path)?))
    }

    /// Save a binary snapshot to disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: &str) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.ledger, path)?;
        self.dirty = false;
        Ok(())
    }

    /// Install a sink that receives the full document after every state change.
    pub fn set_state_sink(&mut self, sink: Box<dyn StateSink>) {
        self.sink = Some(sink);
    }

    pub fn clear_state_sink(&mut self) {
        self.sink = None;
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Balances for the live period.
    #[must_use]
    pub fn get_balances(&self) -> Vec<Balance> {
        self.get_settlement().balances
    }

    /// Debts for the live period.
    #[must_use]
    pub fn get_debts(&self) -> Vec<Debt> {
        self.get_settlement().debts
    }

    /// Full settlement report (total, share, balances, debts) for the live period.
    #[must_use]
    pub fn get_settlement(&self) -> SettlementReport {
        self.strategy.settle(&SettlementInput::from_ledger(&self.ledger))
    }

    /// Archived months, oldest first.
    #[must_use]
    pub fn get_archive(&self) -> &[ArchiveEntry] {
        &self.ledger.archive
    }

    #[must_use]
    pub fn get_archive_entry(&self, period: PeriodKey) -> Option<&ArchiveEntry> {
        self.ledger.archive_entry(period)
    }

    /// Balances of an archived month, recomputed from its frozen roster.
    pub fn archive_report(&self, period: PeriodKey) -> Result<SettlementReport, CoreError> {
        self.archive_service
            .archived_report(&self.ledger, self.strategy.as_ref(), period)
    }

    #[must_use]
    pub fn get_pending_period(&self) -> Option<PeriodKey> {
        self.ledger.pending_period
    }

    #[must_use]
    pub fn period_state(&self) -> PeriodState {
        self.ledger.period_state()
    }

    /// The period the live expenses belong to.
    #[must_use]
    pub fn current_period(&self) -> PeriodKey {
        self.ledger.current_period
    }

    /// The period currently blocking new spending, if any.
    #[must_use]
    pub fn spending_blocked_by(&self) -> Option<PeriodKey> {
        self.ledger.blocking_period()
    }

    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.ledger.participants
    }

    #[must_use]
    pub fn collector(&self) -> Option<&Participant> {
        self.ledger.collector()
    }

    #[must_use]
    pub fn get_expense(&self, expense_id: Uuid) -> Option<&Expense> {
        self.ledger.expense(expense_id)
    }

    /// Live expenses, newest first.
    #[must_use]
    pub fn get_expenses(&self) -> Vec<&Expense> {
        self.get_expenses_sorted(&ExpenseSortOrder::NewestFirst)
    }

    #[must_use]
    pub fn get_expenses_sorted(&self, order: &ExpenseSortOrder) -> Vec<&Expense> {
        self.ledger_service.get_expenses(&self.ledger, order)
    }

    /// Live expenses paid by one participant, newest first.
    #[must_use]
    pub fn get_expenses_by_payer(&self, payer_id: Uuid) -> Vec<&Expense> {
        self.get_expenses()
            .into_iter()
            .filter(|e| e.payer_id == payer_id)
            .collect()
    }

    /// Live expenses in one category, newest first.
    #[must_use]
    pub fn get_expenses_by_category(&self, category: Category) -> Vec<&Expense> {
        self.get_expenses()
            .into_iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Live expenses recorded within `[from, to]`, newest first.
    #[must_use]
    pub fn get_expenses_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Expense> {
        self.ledger_service
            .get_expenses_between(&self.ledger, from, to)
    }

    /// Recorded payments for the live period, in recording order.
    #[must_use]
    pub fn get_payments(&self) -> &[SettlementPayment] {
        &self.ledger.payments
    }

    #[must_use]
    pub fn get_advance(&self, participant_id: Uuid) -> f64 {
        self.ledger.advances.get(&participant_id).copied().unwrap_or(0.0)
    }

    /// Dashboard figures for the live period.
    #[must_use]
    pub fn summary(&self) -> PeriodSummary {
        self.analytics_service
            .summarize(&self.ledger.expenses, &self.ledger.participants)
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.ledger.settings
    }

    /// The whole document, read-only.
    #[must_use]
    pub fn state(&self) -> &LedgerState {
        &self.ledger
    }

    /// The engine's notion of "now" (honours the clock override).
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Returns `true` if the ledger has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Expenses ────────────────────────────────────────────────────

    /// Record an expense timestamped with the engine's "now".
    /// Rejected with `SettlementPending` while a period awaits settlement.
    pub fn add_expense(
        &mut self,
        payer_id: Uuid,
        amount: f64,
        category: Category,
        title: Option<String>,
    ) -> Result<Uuid, CoreError> {
        self.sync();
        let expense = Expense::new(payer_id, amount, category, self.clock.now()).with_title(title);
        let id = expense.id;
        self.ledger_service.add_expense(&mut self.ledger, expense)?;
        self.finish();
        Ok(id)
    }

    /// Edit an expense in place. Same blocking rule as `add_expense`.
    pub fn edit_expense(&mut self, expense_id: Uuid, update: ExpenseUpdate) -> Result<(), CoreError> {
        self.sync();
        self.ledger_service
            .edit_expense(&mut self.ledger, expense_id, update)?;
        self.finish();
        Ok(())
    }

    /// Delete an expense. Always allowed.
    pub fn delete_expense(&mut self, expense_id: Uuid) -> Result<Expense, CoreError> {
        self.sync();
        let removed = self
            .ledger_service
            .delete_expense(&mut self.ledger, expense_id)?;
        self.finish();
        Ok(removed)
    }

    // ── Roster ──────────────────────────────────────────────────────

    /// Add a participant. The first participant becomes the collector.
    pub fn add_participant(&mut self, name: &str) -> Result<Uuid, CoreError> {
        self.sync();
        let id = self.roster_service.add_participant(&mut self.ledger, name)?;
        self.finish();
        Ok(id)
    }

    /// Remove a participant along with their expenses, payments and advance.
    pub fn remove_participant(&mut self, participant_id: Uuid) -> Result<Participant, CoreError> {
        self.sync();
        let removed = self
            .roster_service
            .remove_participant(&mut self.ledger, participant_id)?;
        self.finish();
        Ok(removed)
    }

    pub fn rename_participant(&mut self, participant_id: Uuid, name: &str) -> Result<(), CoreError> {
        self.sync();
        self.roster_service
            .rename_participant(&mut self.ledger, participant_id, name)?;
        self.finish();
        Ok(())
    }

    /// Make a participant the sole collector.
    pub fn set_collector(&mut self, participant_id: Uuid) -> Result<(), CoreError> {
        self.sync();
        self.roster_service
            .set_collector(&mut self.ledger, participant_id)?;
        self.finish();
        Ok(())
    }

    // ── Payments ────────────────────────────────────────────────────

    /// Record a settlement payment. Always allowed; if it clears the last debt
    /// of a pending period, that period closes immediately.
    pub fn record_payment(&mut self, from: Uuid, to: Uuid, amount: f64) -> Result<Uuid, CoreError> {
        self.sync();
        let payment = SettlementPayment::new(from, to, amount, self.clock.now());
        let id = payment.id;
        self.ledger_service.record_payment(&mut self.ledger, payment)?;
        self.finish();
        Ok(id)
    }

    /// Settle a debt exactly as computed: records `from → to` for its amount.
    pub fn pay_debt(&mut self, debt: &Debt) -> Result<Uuid, CoreError> {
        self.record_payment(debt.from, debt.to, debt.amount)
    }

    /// Retract a payment.
    pub fn undo_payment(&mut self, payment_id: Uuid) -> Result<SettlementPayment, CoreError> {
        self.sync();
        let removed = self
            .ledger_service
            .undo_payment(&mut self.ledger, payment_id)?;
        self.finish();
        Ok(removed)
    }

    /// Set a manual advance (peer settlement model). Zero clears it.
    pub fn set_advance(&mut self, participant_id: Uuid, amount: f64) -> Result<(), CoreError> {
        self.sync();
        self.ledger_service
            .set_advance(&mut self.ledger, participant_id, amount)?;
        self.finish();
        Ok(())
    }

    // ── Period & Archive ────────────────────────────────────────────

    /// Re-evaluate rollover / pending settlement. Called by the periodic
    /// watcher; harmless to call at any time.
    pub fn tick(&mut self) -> ArchiveOutcome {
        let outcome = self.evaluate();
        if outcome.changed_state() {
            self.mark_changed();
        }
        outcome
    }

    /// Close the period immediately preceding the current month on demand.
    /// Fails with `OutstandingDebts` unless every debt is paid.
    pub fn force_close_period(&mut self) -> Result<ArchiveOutcome, CoreError> {
        self.sync();
        let current = self.clock.current_period();
        let now = self.clock.now();
        let outcome = self.archive_service.force_close(
            &mut self.ledger,
            self.strategy.as_ref(),
            current,
            now,
        )?;
        if outcome.changed_state() {
            self.mark_changed();
        }
        Ok(outcome)
    }

    /// Permanently delete an archived month, settled or not.
    /// The caller must have obtained the user's confirmation.
    pub fn delete_archive_entry(&mut self, period: PeriodKey) -> Result<ArchiveEntry, CoreError> {
        self.sync();
        let removed = self.archive_service.delete_entry(&mut self.ledger, period)?;
        self.mark_changed();
        Ok(removed)
    }

    /// Mark an archived month as settled, lifting its spending block.
    pub fn mark_archive_settled(&mut self, period: PeriodKey) -> Result<(), CoreError> {
        self.sync();
        let current = self.clock.current_period();
        self.archive_service
            .mark_settled(&mut self.ledger, period, current)?;
        self.mark_changed();
        Ok(())
    }

    /// Test/debug hook: pin "now" to `at`, or return to wall-clock time with `None`.
    /// The rollover check runs right away against the new time.
    pub fn set_clock_override(&mut self, at: Option<DateTime<Utc>>) -> ArchiveOutcome {
        debug!(?at, "clock override changed");
        self.clock.set_override(at);
        self.tick()
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Set the display currency. Must be exactly 3 ASCII letters.
    pub fn set_currency(&mut self, currency: &str) -> Result<(), CoreError> {
        self.sync();
        let trimmed = currency.trim().to_uppercase();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{currency}': must be exactly 3 ASCII letters (e.g., SAR, EUR, USD)"
            )));
        }
        self.ledger.settings.currency = trimmed;
        self.mark_changed();
        Ok(())
    }

    /// Switch settlement strategy. Debts are recomputed, so a pending period
    /// may close as a result.
    pub fn set_settlement_model(&mut self, model: SettlementModel) {
        self.sync();
        self.ledger.settings.settlement_model = model;
        self.strategy = settlement::strategy_for(model);
        self.finish();
    }

    /// Change archive retention and apply it right away.
    pub fn set_retention_policy(&mut self, policy: RetentionPolicy) -> Result<usize, CoreError> {
        self.sync();
        if policy == RetentionPolicy::KeepMonths(0) {
            return Err(CoreError::ValidationError(
                "Retention window must be at least one month".into(),
            ));
        }
        self.ledger.settings.retention = policy;
        let current = self.clock.current_period();
        let removed = self.archive_service.prune(&mut self.ledger, current);
        self.mark_changed();
        Ok(removed)
    }

    /// Polling interval for the rollover watcher, 1..=60 seconds.
    pub fn set_poll_interval_secs(&mut self, secs: u64) -> Result<(), CoreError> {
        self.sync();
        if !(1..=MAX_POLL_INTERVAL_SECS).contains(&secs) {
            return Err(CoreError::ValidationError(format!(
                "Poll interval must be between 1 and {MAX_POLL_INTERVAL_SECS} seconds, got {secs}"
            )));
        }
        self.ledger.settings.poll_interval_secs = secs;
        self.mark_changed();
        Ok(())
    }

    /// Wipe every participant, expense, payment and archived month, and restore
    /// default settings. The roster restarts with a single collector.
    pub fn reset_all_data(&mut self) {
        self.ledger = LedgerState::new(self.clock.current_period());
        self.ledger
            .participants
            .push(Participant::collector(DEFAULT_COLLECTOR_NAME));
        self.strategy = settlement::strategy_for(self.ledger.settings.settlement_model);
        self.mark_changed();
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(ledger: LedgerState, clock: PeriodClock) -> Self {
        let strategy = settlement::strategy_for(ledger.settings.settlement_model);
        Self {
            ledger,
            clock,
            strategy,
            ledger_service: LedgerService::new(),
            roster_service: RosterService::new(),
            archive_service: ArchiveService::new(),
            analytics_service: AnalyticsService::new(),
            sink: None,
            dirty: false,
        }
    }

    fn evaluate(&mut self) -> ArchiveOutcome {
        let current = self.clock.current_period();
        let now = self.clock.now();
        self.archive_service
            .evaluate(&mut self.ledger, self.strategy.as_ref(), current, now)
    }

    /// Apply any pending rollover before a command runs.
    fn sync(&mut self) {
        if self.evaluate().changed_state() {
            self.mark_changed();
        }
    }

    /// After a successful command: re-check settlement, then mirror.
    fn finish(&mut self) {
        self.evaluate();
        self.mark_changed();
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.persist(&self.ledger) {
                warn!(error = %e, "failed to mirror ledger state");
            }
        }
    }
}
