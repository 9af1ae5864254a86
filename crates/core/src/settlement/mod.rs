pub mod collector;
pub mod peer;
pub mod traits;

use crate::models::settings::SettlementModel;

use collector::CollectorSettlement;
use peer::PeerSettlement;
use traits::SettlementStrategy;

/// Build the strategy for the configured model.
pub fn strategy_for(model: SettlementModel) -> Box<dyn SettlementStrategy> {
    match model {
        SettlementModel::Collector => Box::new(CollectorSettlement::new()),
        SettlementModel::Peer => Box::new(PeerSettlement::new()),
    }
}
