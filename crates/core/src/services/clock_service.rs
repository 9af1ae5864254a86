use chrono::{DateTime, Utc};

use crate::models::period::PeriodKey;

/// Source of "now" for the engine.
///
/// Production always reads the wall clock. The override exists so tests and
/// debug tooling can move time deterministically without touching the data.
#[derive(Debug, Clone, Default)]
pub struct PeriodClock {
    override_now: Option<DateTime<Utc>>,
}

impl PeriodClock {
    pub fn new() -> Self {
        Self { override_now: None }
    }

    /// A clock pinned to `at`.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self {
            override_now: Some(at),
        }
    }

    /// Pin the clock to `at`, or return to wall-clock time with `None`.
    pub fn set_override(&mut self, at: Option<DateTime<Utc>>) {
        self.override_now = at;
    }

    pub fn override_now(&self) -> Option<DateTime<Utc>> {
        self.override_now
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.override_now.unwrap_or_else(Utc::now)
    }

    pub fn current_period(&self) -> PeriodKey {
        PeriodKey::from_datetime(&self.now())
    }

    /// Strictly-later check. Equal periods never roll over, and neither does a
    /// clock that has moved backwards.
    pub fn is_rollover(stored: PeriodKey, current: PeriodKey) -> bool {
        stored < current
    }

    pub fn has_rolled_over(&self, stored: PeriodKey) -> bool {
        Self::is_rollover(stored, self.current_period())
    }
}
