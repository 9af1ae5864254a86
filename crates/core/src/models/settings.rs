use serde::{Deserialize, Serialize};

/// Which settlement strategy turns balances into debts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SettlementModel {
    /// Every debt is routed through the designated collector.
    #[default]
    Collector,
    /// No collector: debtors pay creditors directly.
    Peer,
}

impl std::fmt::Display for SettlementModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementModel::Collector => write!(f, "Collector"),
            SettlementModel::Peer => write!(f, "Peer"),
        }
    }
}

/// How long closed months stay in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RetentionPolicy {
    /// Keep every archived month until the user deletes it.
    #[default]
    KeepAll,
    /// Keep only months within the last `n` calendar months of wall-clock time.
    KeepMonths(u32),
}

/// Default polling interval for rollover detection, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// User-configurable settings, stored inside the persisted ledger document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Display currency code (e.g., "SAR", "EUR").
    pub currency: String,

    /// Strategy used to compute debts.
    #[serde(default)]
    pub settlement_model: SettlementModel,

    /// Archive retention.
    #[serde(default)]
    pub retention: RetentionPolicy,

    /// How often the background watcher re-checks for a month rollover.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Settings {
    /// Render an amount with two decimals and the currency code, e.g. `"12.50 SAR"`.
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{:.2} {}", amount, self.currency)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "SAR".to_string(),
            settlement_model: SettlementModel::default(),
            retention: RetentionPolicy::default(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}
