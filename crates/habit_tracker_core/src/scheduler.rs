//! crates/habit_tracker_core/src/scheduler.rs
//!
//! The reminder scheduler: decides which reminders are due at a given clock
//! reading and guarantees each occurrence is dispatched at most once.
//!
//! Matching is exact-minute equality, not a range. If the poll loop skips the
//! minute (system sleep, a stalled runtime), the reminder silently misses that
//! day. Range-matching was rejected because it risks double dispatch across
//! adjacent polls.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::domain::{AudioCategory, Reminder, TimeOfDay};

/// One occurrence already dispatched: (calendar day, reminder, time slot).
///
/// The day is embedded in the key, so entries from a previous day can never
/// match again and no explicit midnight reset is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiredKey {
    pub day: NaiveDate,
    pub reminder_id: Uuid,
    pub at: TimeOfDay,
}

/// A due occurrence produced by one tick, carrying the side-effect payload.
#[derive(Debug, Clone)]
pub struct Firing {
    pub reminder_id: Uuid,
    pub title: String,
    pub message: String,
    /// `Some` when the reminder wants a recitation played alongside the
    /// notification.
    pub audio: Option<AudioCategory>,
}

/// Owns the fired-set and evaluates reminders against the clock.
///
/// The scheduler holds no timer of its own; a caller polls [`tick`] at a
/// fixed interval (30 seconds in the service) and dispatches the returned
/// firings to the side-effect sinks.
///
/// [`tick`]: ReminderScheduler::tick
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    fired: HashSet<FiredKey>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates every active reminder against `now` and returns the
    /// occurrences that are due and not yet dispatched today.
    ///
    /// A reminder is due iff its rule makes it eligible on `now`'s weekday
    /// AND its time-of-day equals `now`'s minute exactly. Reminders without
    /// a valid time-of-day are never due.
    pub fn tick(&mut self, now: NaiveDateTime, reminders: &[Reminder]) -> Vec<Firing> {
        let today = now.date();
        // Stale keys from other days can never match again; drop them so the
        // set stays bounded across long-lived sessions.
        self.fired.retain(|key| key.day == today);

        let this_minute = TimeOfDay::from_time(now.time());
        let weekday = now.weekday();
        let mut due = Vec::new();

        for reminder in reminders {
            if !reminder.active {
                continue;
            }
            let Some(at) = reminder.time_of_day else {
                continue;
            };
            if !reminder.rule.applies_on(weekday) || at != this_minute {
                continue;
            }

            let key = FiredKey {
                day: today,
                reminder_id: reminder.id,
                at,
            };
            if self.fired.insert(key) {
                due.push(Firing {
                    reminder_id: reminder.id,
                    title: reminder.title.clone(),
                    message: reminder.message.clone(),
                    audio: reminder.play_audio.then_some(reminder.audio_category),
                });
            }
        }

        due
    }

    /// Forgets every dispatched occurrence.
    ///
    /// Called whenever a reminder's schedule is created, edited, toggled or
    /// deleted. The whole set is cleared rather than one reminder's entries,
    /// trading a possible duplicate fire at the edit moment for simplicity.
    pub fn invalidate(&mut self) {
        self.fired.clear();
    }

    /// Number of occurrences remembered for the current day.
    pub fn fired_today(&self) -> usize {
        self.fired.len()
    }
}
