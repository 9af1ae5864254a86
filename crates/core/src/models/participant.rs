use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A roommate sharing the household expenses.
///
/// Exactly one participant in a non-empty roster carries `is_collector`:
/// the person who physically receives and pays out settlement money.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Unique identifier within the ledger
    pub id: Uuid,

    /// Display name (never empty)
    pub name: String,

    /// Designated collector ("admin")
    #[serde(default)]
    pub is_collector: bool,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            is_collector: false,
        }
    }

    /// Create a participant that is already the collector.
    pub fn collector(name: impl Into<String>) -> Self {
        Self {
            is_collector: true,
            ..Self::new(name)
        }
    }
}
