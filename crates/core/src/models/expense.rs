use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed set of spending categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Groceries,
    Food,
    Other,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Groceries, Category::Food, Category::Other];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Groceries => write!(f, "Groceries"),
            Category::Food => write!(f, "Food"),
            Category::Other => write!(f, "Other"),
        }
    }
}

/// Sort order for expense listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseSortOrder {
    /// Newest first (default for display)
    NewestFirst,
    OldestFirst,
    /// Largest amount first
    AmountDesc,
    AmountAsc,
}

/// One purchase paid by a single participant and split equally across the roster.
///
/// `id` and `occurred_at` never change; an edit replaces the other fields in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,

    /// Participant who paid
    pub payer_id: Uuid,

    /// Always positive
    pub amount: f64,

    pub category: Category,

    /// When the expense was recorded
    pub occurred_at: DateTime<Utc>,

    /// Optional free-text label (e.g. "Weekly shop")
    #[serde(default)]
    pub title: Option<String>,
}

impl Expense {
    pub fn new(payer_id: Uuid, amount: f64, category: Category, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payer_id,
            amount,
            category,
            occurred_at,
            title: None,
        }
    }

    /// Attach a label, dropping blank ones.
    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = normalize_title(title);
        self
    }
}

/// Fields an edit may replace. Identity and timestamp are not among them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseUpdate {
    pub payer_id: Uuid,
    pub amount: f64,
    pub category: Category,
    pub title: Option<String>,
}

pub(crate) fn normalize_title(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
