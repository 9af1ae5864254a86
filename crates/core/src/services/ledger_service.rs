use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::expense::{normalize_title, Expense, ExpenseSortOrder, ExpenseUpdate};
use crate::models::ledger::LedgerState;
use crate::models::payment::SettlementPayment;

/// Manages expenses, settlement payments and advances of the live period.
///
/// Pure business logic: no I/O and no clock. Every operation validates first
/// and mutates only once nothing can fail.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Add a new expense. Rejected while any period awaits settlement.
    pub fn add_expense(&self, ledger: &mut LedgerState, expense: Expense) -> Result<(), CoreError> {
        Self::ensure_spending_allowed(ledger)?;
        Self::validate_amount(expense.amount, "Expense amount")?;
        Self::ensure_participant(ledger, expense.payer_id)?;
        ledger.expenses.push(expense);
        Ok(())
    }

    /// Replace payer/amount/category/title in place. The id and the original
    /// timestamp are kept.
    pub fn edit_expense(
        &self,
        ledger: &mut LedgerState,
        expense_id: Uuid,
        update: ExpenseUpdate,
    ) -> Result<(), CoreError> {
        Self::ensure_spending_allowed(ledger)?;
        Self::validate_amount(update.amount, "Expense amount")?;
        Self::ensure_participant(ledger, update.payer_id)?;

        let expense = ledger
            .expenses
            .iter_mut()
            .find(|e| e.id == expense_id)
            .ok_or_else(|| CoreError::ExpenseNotFound(expense_id.to_string()))?;

        expense.payer_id = update.payer_id;
        expense.amount = update.amount;
        expense.category = update.category;
        expense.title = normalize_title(update.title);
        Ok(())
    }

    /// Delete an expense. Always allowed, even while settlement is pending.
    pub fn delete_expense(&self, ledger: &mut LedgerState, expense_id: Uuid) -> Result<Expense, CoreError> {
        let idx = ledger
            .expenses
            .iter()
            .position(|e| e.id == expense_id)
            .ok_or_else(|| CoreError::ExpenseNotFound(expense_id.to_string()))?;
        Ok(ledger.expenses.remove(idx))
    }

    /// Record money handed over between two participants.
    /// Always allowed: this is how a pending period gets unblocked.
    pub fn record_payment(&self, ledger: &mut LedgerState, payment: SettlementPayment) -> Result<(), CoreError> {
        Self::validate_amount(payment.amount, "Payment amount")?;
        Self::ensure_participant(ledger, payment.from)?;
        Self::ensure_participant(ledger, payment.to)?;
        ledger.payments.push(payment);
        Ok(())
    }

    /// Retract a payment. Balances afterwards equal those before it was recorded.
    pub fn undo_payment(&self, ledger: &mut LedgerState, payment_id: Uuid) -> Result<SettlementPayment, CoreError> {
        let idx = ledger
            .payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or_else(|| CoreError::PaymentNotFound(payment_id.to_string()))?;
        Ok(ledger.payments.remove(idx))
    }

    /// Set a manual advance for a participant (peer model). Zero clears it.
    /// May be negative: the group already handed money to this participant.
    pub fn set_advance(&self, ledger: &mut LedgerState, participant_id: Uuid, amount: f64) -> Result<(), CoreError> {
        if !amount.is_finite() {
            return Err(CoreError::ValidationError(
                "Advance must be a finite number".into(),
            ));
        }
        Self::ensure_participant(ledger, participant_id)?;
        if amount == 0.0 {
            ledger.advances.remove(&participant_id);
        } else {
            ledger.advances.insert(participant_id, amount);
        }
        Ok(())
    }

    /// Expenses in the requested order.
    pub fn get_expenses<'a>(&self, ledger: &'a LedgerState, order: &ExpenseSortOrder) -> Vec<&'a Expense> {
        let mut expenses: Vec<&Expense> = ledger.expenses.iter().collect();
        match order {
            ExpenseSortOrder::NewestFirst => expenses.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at)),
            ExpenseSortOrder::OldestFirst => expenses.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at)),
            ExpenseSortOrder::AmountDesc => expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
            ExpenseSortOrder::AmountAsc => expenses.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
        }
        expenses
    }

    /// Expenses recorded within `[from, to]`, newest first.
    pub fn get_expenses_between<'a>(
        &self,
        ledger: &'a LedgerState,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<&'a Expense> {
        let mut expenses: Vec<&Expense> = ledger
            .expenses
            .iter()
            .filter(|e| e.occurred_at >= from && e.occurred_at <= to)
            .collect();
        expenses.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        expenses
    }

    /// Reject spend-mutating commands while a period blocks spending.
    pub fn ensure_spending_allowed(ledger: &LedgerState) -> Result<(), CoreError> {
        match ledger.blocking_period() {
            Some(period) => Err(CoreError::SettlementPending { period }),
            None => Ok(()),
        }
    }

    fn validate_amount(amount: f64, what: &str) -> Result<(), CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "{what} must be a positive number, got {amount}"
            )));
        }
        Ok(())
    }

    fn ensure_participant(ledger: &LedgerState, participant_id: Uuid) -> Result<(), CoreError> {
        ledger
            .participant(participant_id)
            .map(|_| ())
            .ok_or_else(|| CoreError::ParticipantNotFound(participant_id.to_string()))
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
