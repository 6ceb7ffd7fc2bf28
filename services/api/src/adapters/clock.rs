//! services/api/src/adapters/clock.rs
//!
//! The production clock adapter. The scheduler works in local wall-clock
//! time because reminder times are entered as local times of day.

use chrono::NaiveDateTime;
use habit_tracker_core::ports::Clock;

/// A `Clock` backed by the system's local time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
