use crate::models::analytics::{CategorySpend, ParticipantSpend, PeriodSummary};
use crate::models::expense::{Category, Expense};
use crate::models::participant::Participant;

/// Computes dashboard analytics for a set of expenses: totals, category
/// breakdown and spending per participant.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Summary for one period's expenses against the given roster.
    ///
    /// Categories with no spending are omitted. Every participant appears in
    /// `by_participant`, in roster order, even with zero spend.
    pub fn summarize(&self, expenses: &[Expense], participants: &[Participant]) -> PeriodSummary {
        let total_spend: f64 = expenses.iter().map(|e| e.amount).sum();
        let share_per_person = if participants.is_empty() {
            0.0
        } else {
            total_spend / participants.len() as f64
        };

        PeriodSummary {
            total_spend,
            expense_count: expenses.len(),
            share_per_person,
            by_category: self.spending_by_category(expenses),
            by_participant: self.spending_by_participant(expenses, participants),
        }
    }

    /// Non-zero category totals, largest first.
    pub fn spending_by_category(&self, expenses: &[Expense]) -> Vec<CategorySpend> {
        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        let mut out: Vec<CategorySpend> = Category::ALL
            .iter()
            .map(|&category| {
                let amount: f64 = expenses
                    .iter()
                    .filter(|e| e.category == category)
                    .map(|e| e.amount)
                    .sum();
                CategorySpend {
                    category,
                    amount,
                    percentage: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
                }
            })
            .filter(|c| c.amount > 0.0)
            .collect();
        out.sort_by(|a, b| b.amount.total_cmp(&a.amount).then(a.category.cmp(&b.category)));
        out
    }

    pub fn spending_by_participant(&self, expenses: &[Expense], participants: &[Participant]) -> Vec<ParticipantSpend> {
        participants
            .iter()
            .map(|p| {
                let (amount, expense_count) = expenses
                    .iter()
                    .filter(|e| e.payer_id == p.id)
                    .fold((0.0, 0), |(sum, n), e| (sum + e.amount, n + 1));
                ParticipantSpend {
                    participant_id: p.id,
                    name: p.name.clone(),
                    amount,
                    expense_count,
                }
            })
            .collect()
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
