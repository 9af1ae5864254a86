use uuid::Uuid;

use crate::models::balance::{Balance, Debt, SettlementReport, SETTLEMENT_EPSILON};
use crate::models::settings::SettlementModel;

use super::traits::{SettlementInput, SettlementStrategy};

/// No collector: participants settle directly with each other.
///
/// `balance(u) = share − (paid(u) + advance(u) + sent(u) − received(u))`,
/// positive = owes. Debts pair the largest debtor with the largest creditor
/// until every balance is within tolerance.
#[derive(Debug, Default, Clone, Copy)]
pub struct PeerSettlement;

impl PeerSettlement {
    pub fn new() -> Self {
        Self
    }

    /// Greedy largest-first matching. Ties break on id so the result does not
    /// depend on roster order.
    fn match_debts(balances: &[Balance]) -> Vec<Debt> {
        let mut debtors: Vec<(Uuid, f64)> = balances
            .iter()
            .filter(|b| b.balance > SETTLEMENT_EPSILON)
            .map(|b| (b.participant_id, b.balance))
            .collect();
        let mut creditors: Vec<(Uuid, f64)> = balances
            .iter()
            .filter(|b| b.balance < -SETTLEMENT_EPSILON)
            .map(|b| (b.participant_id, -b.balance))
            .collect();

        let order = |a: &(Uuid, f64), b: &(Uuid, f64)| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0));
        debtors.sort_by(order);
        creditors.sort_by(order);

        let mut debts = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < debtors.len() && j < creditors.len() {
            let amount = debtors[i].1.min(creditors[j].1);
            if amount > SETTLEMENT_EPSILON {
                debts.push(Debt {
                    from: debtors[i].0,
                    to: creditors[j].0,
                    amount,
                });
            }
            debtors[i].1 -= amount;
            creditors[j].1 -= amount;
            if debtors[i].1 <= SETTLEMENT_EPSILON {
                i += 1;
            }
            if creditors[j].1 <= SETTLEMENT_EPSILON {
                j += 1;
            }
        }
        debts
    }
}

impl SettlementStrategy for PeerSettlement {
    fn model(&self) -> SettlementModel {
        SettlementModel::Peer
    }

    fn settle(&self, input: &SettlementInput<'_>) -> SettlementReport {
        let total_spend = input.total_spend();
        let share = input.share();
        let collector_id = input.collector().map(|c| c.id);

        let balances: Vec<Balance> = input
            .participants
            .iter()
            .map(|participant| {
                let paid = input.paid_by(participant.id);
                let advance = input.advance_of(participant.id);
                let transferred = input.sent_by(participant.id) - input.received_by(participant.id);
                Balance {
                    participant_id: participant.id,
                    name: participant.name.clone(),
                    paid,
                    advance,
                    transferred,
                    share,
                    balance: share - (paid + advance + transferred),
                    is_collector: Some(participant.id) == collector_id,
                }
            })
            .collect();

        let debts = Self::match_debts(&balances);

        SettlementReport {
            total_spend,
            share,
            balances,
            debts,
        }
    }
}
