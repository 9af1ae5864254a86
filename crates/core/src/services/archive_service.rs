use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::archive::{ArchiveEntry, ArchiveOutcome};
use crate::models::balance::SettlementReport;
use crate::models::ledger::LedgerState;
use crate::models::period::PeriodKey;
use crate::models::settings::RetentionPolicy;
use crate::settlement::traits::{SettlementInput, SettlementStrategy};

use super::clock_service::PeriodClock;

/// Month-close state machine: `Open → PendingSettlement → Closed`.
///
/// Closing a period snapshots it into the archive, clears the live
/// expenses/payments/advances (never the roster) and moves the ledger to the
/// new current period. A period only closes once its debts are empty.
pub struct ArchiveService;

impl ArchiveService {
    pub fn new() -> Self {
        Self
    }

    /// One rollover evaluation. Safe to call as often as needed: calling it
    /// again without a clock or ledger change returns `Unchanged`.
    ///
    /// - pending period whose debts have cleared → close it
    /// - stored period behind `current` with no debts → close it
    /// - stored period behind `current` with debts → mark it pending
    pub fn evaluate(
        &self,
        ledger: &mut LedgerState,
        strategy: &dyn SettlementStrategy,
        current: PeriodKey,
        now: DateTime<Utc>,
    ) -> ArchiveOutcome {
        if let Some(pending) = ledger.pending_period {
            let report = strategy.settle(&SettlementInput::from_ledger(ledger));
            if report.is_settled() {
                self.close(ledger, pending, report, current, now);
                return ArchiveOutcome::Closed(pending);
            }
            return ArchiveOutcome::Unchanged;
        }

        if !PeriodClock::is_rollover(ledger.current_period, current) {
            return ArchiveOutcome::Unchanged;
        }

        let ended = ledger.current_period;
        if ledger.is_archived(ended) {
            ledger.current_period = current;
            debug!(from = %ended, to = %current, "period already archived, advancing");
            return ArchiveOutcome::Advanced { from: ended, to: current };
        }

        let report = strategy.settle(&SettlementInput::from_ledger(ledger));
        if report.is_settled() {
            self.close(ledger, ended, report, current, now);
            return ArchiveOutcome::Closed(ended);
        }

        info!(period = %ended, debts = report.debts.len(), "period ended with outstanding debts, awaiting settlement");
        ledger.pending_period = Some(ended);
        ArchiveOutcome::Pending(ended)
    }

    /// Manual close. Same precondition as the automatic path (no debts), and
    /// only for the period immediately before `current`; older unarchived
    /// periods are left to the rollover path.
    ///
    /// Calling it again once the previous period is closed is a no-op.
    pub fn force_close(
        &self,
        ledger: &mut LedgerState,
        strategy: &dyn SettlementStrategy,
        current: PeriodKey,
        now: DateTime<Utc>,
    ) -> Result<ArchiveOutcome, CoreError> {
        let previous = current.previous();
        let target = ledger.pending_period.unwrap_or(ledger.current_period);

        if ledger.pending_period.is_none()
            && target >= current
            && ledger.last_archived_period == Some(previous)
        {
            return Ok(ArchiveOutcome::Unchanged);
        }
        if target >= current {
            return Err(CoreError::PeriodNotClosable(format!(
                "{target} is the current period and is still open"
            )));
        }
        if target != previous {
            return Err(CoreError::PeriodNotClosable(format!(
                "only {previous} can be closed manually; {target} must be archived by rollover"
            )));
        }
        if ledger.is_archived(target) {
            return Err(CoreError::PeriodNotClosable(format!(
                "{target} is already archived"
            )));
        }

        let report = strategy.settle(&SettlementInput::from_ledger(ledger));
        if !report.is_settled() {
            return Err(CoreError::OutstandingDebts {
                period: target,
                count: report.debts.len(),
            });
        }

        self.close(ledger, target, report, current, now);
        Ok(ArchiveOutcome::Closed(target))
    }

    /// Delete an archived month. Allowed regardless of its settled flag; the
    /// caller is responsible for confirming with the user first.
    pub fn delete_entry(&self, ledger: &mut LedgerState, period: PeriodKey) -> Result<ArchiveEntry, CoreError> {
        let idx = ledger
            .archive
            .iter()
            .position(|a| a.period == period)
            .ok_or_else(|| CoreError::ArchiveEntryNotFound(period.to_string()))?;
        let removed = ledger.archive.remove(idx);
        info!(period = %period, settled = removed.settled, "archive entry deleted");
        Ok(removed)
    }

    /// Flip an archived month to settled.
    pub fn mark_settled(&self, ledger: &mut LedgerState, period: PeriodKey, current: PeriodKey) -> Result<(), CoreError> {
        let entry = ledger
            .archive
            .iter_mut()
            .find(|a| a.period == period)
            .ok_or_else(|| CoreError::ArchiveEntryNotFound(period.to_string()))?;
        entry.settled = true;
        self.prune(ledger, current);
        Ok(())
    }

    /// Apply the retention policy. Only settled snapshots are ever pruned.
    /// Returns the number of entries removed.
    pub fn prune(&self, ledger: &mut LedgerState, current: PeriodKey) -> usize {
        let RetentionPolicy::KeepMonths(months) = ledger.settings.retention else {
            return 0;
        };
        let cutoff = current.minus_months(months);
        let pending = ledger.pending_period;
        let before = ledger.archive.len();
        ledger
            .archive
            .retain(|a| a.period >= cutoff || !a.settled || Some(a.period) == pending);
        let removed = before - ledger.archive.len();
        if removed > 0 {
            debug!(removed, cutoff = %cutoff, "pruned archive entries outside retention window");
        }
        removed
    }

    /// Recompute the balances of an archived month from its frozen data.
    pub fn archived_report(
        &self,
        ledger: &LedgerState,
        strategy: &dyn SettlementStrategy,
        period: PeriodKey,
    ) -> Result<SettlementReport, CoreError> {
        let entry = ledger
            .archive_entry(period)
            .ok_or_else(|| CoreError::ArchiveEntryNotFound(period.to_string()))?;
        Ok(strategy.settle(&SettlementInput::from_archive(entry)))
    }

    fn close(
        &self,
        ledger: &mut LedgerState,
        period: PeriodKey,
        report: SettlementReport,
        current: PeriodKey,
        now: DateTime<Utc>,
    ) {
        let entry = ArchiveEntry {
            period,
            participants: ledger.participants.clone(),
            expenses: std::mem::take(&mut ledger.expenses),
            payments: std::mem::take(&mut ledger.payments),
            advances: std::mem::take(&mut ledger.advances),
            total_spend: report.total_spend,
            settled: report.is_settled(),
            final_balances: report.balances,
            final_debts: report.debts,
            archived_at: now,
        };

        let pos = ledger
            .archive
            .binary_search_by_key(&period, |a| a.period)
            .unwrap_or_else(|pos| pos);
        ledger.archive.insert(pos, entry);

        // Never step backwards, even if the clock did.
        ledger.current_period = current.max(period.next());
        ledger.last_archived_period = Some(period);
        ledger.pending_period = None;

        info!(period = %period, next = %ledger.current_period, "period closed and archived");
        self.prune(ledger, current);
    }
}

impl Default for ArchiveService {
    fn default() -> Self {
        Self::new()
    }
}
