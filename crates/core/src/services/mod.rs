pub mod analytics_service;
pub mod archive_service;
pub mod clock_service;
pub mod ledger_service;
pub mod roster_service;
