use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Amounts within this distance of zero are treated as settled
/// (one currency minor unit).
pub const SETTLEMENT_EPSILON: f64 = 0.01;

/// One participant's standing for a period.
///
/// Sign convention for `balance`: positive means the participant still owes
/// money, negative means money is owed to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub participant_id: Uuid,
    pub name: String,
    /// Sum of expenses this participant paid for
    pub paid: f64,
    /// Manual out-of-band correction (peer model only, zero otherwise)
    pub advance: f64,
    /// Net settlement money counted towards this participant
    pub transferred: f64,
    /// Equal share of the period's total spend
    pub share: f64,
    pub balance: f64,
    pub is_collector: bool,
}

impl Balance {
    /// Is the participant within tolerance of even?
    pub fn is_settled(&self) -> bool {
        self.balance.abs() <= SETTLEMENT_EPSILON
    }
}

/// A directed obligation: `from` should pay `amount` to `to`.
///
/// `from == to` is the collector's self-debt: the part of their own share
/// they have not yet put in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: f64,
}

impl Debt {
    pub fn is_self_debt(&self) -> bool {
        self.from == self.to
    }
}

/// Full output of a settlement calculation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub total_spend: f64,
    pub share: f64,
    pub balances: Vec<Balance>,
    pub debts: Vec<Debt>,
}

impl SettlementReport {
    /// No debts remain: the period may close.
    pub fn is_settled(&self) -> bool {
        self.debts.is_empty()
    }

    pub fn balance_for(&self, participant_id: Uuid) -> Option<&Balance> {
        self.balances.iter().find(|b| b.participant_id == participant_id)
    }

    /// Sum of all outstanding non-self debts owed *to* the collector.
    pub fn to_collect(&self) -> f64 {
        self.debts
            .iter()
            .filter(|d| !d.is_self_debt() && self.is_collector(d.to))
            .map(|d| d.amount)
            .sum()
    }

    /// Sum of all outstanding non-self debts the collector must pay out.
    pub fn to_pay_out(&self) -> f64 {
        self.debts
            .iter()
            .filter(|d| !d.is_self_debt() && self.is_collector(d.from))
            .map(|d| d.amount)
            .sum()
    }

    fn is_collector(&self, id: Uuid) -> bool {
        self.balance_for(id).is_some_and(|b| b.is_collector)
    }
}
