pub mod analytics;
pub mod archive;
pub mod balance;
pub mod expense;
pub mod ledger;
pub mod participant;
pub mod payment;
pub mod period;
pub mod settings;
