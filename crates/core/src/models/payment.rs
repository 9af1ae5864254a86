use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Money actually handed over between two participants.
///
/// Typical shapes: roommate → collector, collector → roommate, and
/// collector → collector (self-settlement bookkeeping). Payments are
/// append-only; an undo removes the entry outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPayment {
    pub id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
    /// Always positive
    pub amount: f64,
    pub occurred_at: DateTime<Utc>,
}

impl SettlementPayment {
    pub fn new(from: Uuid, to: Uuid, amount: f64, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            amount,
            occurred_at,
        }
    }

    /// A collector paying into their own share.
    pub fn is_self_payment(&self) -> bool {
        self.from == self.to
    }
}
