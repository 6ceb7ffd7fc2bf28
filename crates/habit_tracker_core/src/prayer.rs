//! crates/habit_tracker_core/src/prayer.rs
//!
//! The five daily prayers and the timetable shown on the dashboard.

use crate::domain::TimeOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fajr => "Fajr",
            Self::Dhuhr => "Dhuhr",
            Self::Asr => "Asr",
            Self::Maghrib => "Maghrib",
            Self::Isha => "Isha",
        };
        write!(f, "{name}")
    }
}

/// One entry in the daily timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prayer {
    pub name: PrayerName,
    pub time: TimeOfDay,
}

/// The configured timetable, in day order.
pub const TIMETABLE: [Prayer; 5] = [
    Prayer {
        name: PrayerName::Fajr,
        time: TimeOfDay { hour: 5, minute: 30 },
    },
    Prayer {
        name: PrayerName::Dhuhr,
        time: TimeOfDay { hour: 12, minute: 45 },
    },
    Prayer {
        name: PrayerName::Asr,
        time: TimeOfDay { hour: 16, minute: 15 },
    },
    Prayer {
        name: PrayerName::Maghrib,
        time: TimeOfDay { hour: 18, minute: 30 },
    },
    Prayer {
        name: PrayerName::Isha,
        time: TimeOfDay { hour: 20, minute: 0 },
    },
];

/// The prayer window the given clock reading falls in and the prayer that
/// follows it. Before Fajr the current prayer is the previous night's Isha.
pub fn current_and_next(now: TimeOfDay) -> (PrayerName, PrayerName) {
    let next_index = TIMETABLE
        .iter()
        .position(|prayer| now < prayer.time)
        .unwrap_or(0);
    let current_index = (next_index + TIMETABLE.len() - 1) % TIMETABLE.len();
    (TIMETABLE[current_index].name, TIMETABLE[next_index].name)
}
