use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::expense::Category;

/// Spending within one category for the open period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: Category,
    pub amount: f64,
    /// Fraction of total spend (0.0–100.0)
    pub percentage: f64,
}

/// How much one participant has paid for in the open period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSpend {
    pub participant_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub expense_count: usize,
}

/// Dashboard figures for the open period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub total_spend: f64,
    pub expense_count: usize,
    pub share_per_person: f64,
    pub by_category: Vec<CategorySpend>,
    pub by_participant: Vec<ParticipantSpend>,
}
