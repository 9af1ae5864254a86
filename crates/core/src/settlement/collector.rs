use crate::models::balance::{Balance, Debt, SettlementReport, SETTLEMENT_EPSILON};
use crate::models::settings::SettlementModel;

use super::traits::{SettlementInput, SettlementStrategy};

/// Every roommate settles with the collector, never with each other.
///
/// For a non-collector `u`:
/// `due(u) = share − (paid(u) + sent(u → collector) − sent(collector → u))`.
/// A positive due becomes `u → collector`, a negative one `collector → u`.
///
/// The collector reconciles against themself:
/// `due = share − (paid(collector) + sent(collector → collector))`, and only a
/// positive due produces a self-debt. An overpaid collector never gets one,
/// since "paying" it would push the figure further negative.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectorSettlement;

impl CollectorSettlement {
    pub fn new() -> Self {
        Self
    }
}

impl SettlementStrategy for CollectorSettlement {
    fn model(&self) -> SettlementModel {
        SettlementModel::Collector
    }

    fn settle(&self, input: &SettlementInput<'_>) -> SettlementReport {
        let total_spend = input.total_spend();
        let share = input.share();

        let Some(collector) = input.collector() else {
            return SettlementReport {
                total_spend,
                share,
                ..SettlementReport::default()
            };
        };
        let collector_id = collector.id;

        let mut balances = Vec::with_capacity(input.participants.len());
        let mut debts = Vec::new();

        for participant in input.participants {
            let paid = input.paid_by(participant.id);

            if participant.id == collector_id {
                let self_paid = input.sent_between(collector_id, collector_id);
                let due = share - (paid + self_paid);
                if due > SETTLEMENT_EPSILON {
                    debts.push(Debt {
                        from: collector_id,
                        to: collector_id,
                        amount: due,
                    });
                }
                balances.push(Balance {
                    participant_id: participant.id,
                    name: participant.name.clone(),
                    paid,
                    advance: 0.0,
                    transferred: self_paid,
                    share,
                    balance: due,
                    is_collector: true,
                });
                continue;
            }

            let transferred = input.sent_between(participant.id, collector_id)
                - input.sent_between(collector_id, participant.id);
            let due = share - (paid + transferred);

            if due > SETTLEMENT_EPSILON {
                debts.push(Debt {
                    from: participant.id,
                    to: collector_id,
                    amount: due,
                });
            } else if due < -SETTLEMENT_EPSILON {
                debts.push(Debt {
                    from: collector_id,
                    to: participant.id,
                    amount: -due,
                });
            }

            balances.push(Balance {
                participant_id: participant.id,
                name: participant.name.clone(),
                paid,
                advance: 0.0,
                transferred,
                share,
                balance: due,
                is_collector: false,
            });
        }

        SettlementReport {
            total_spend,
            share,
            balances,
            debts,
        }
    }
}
