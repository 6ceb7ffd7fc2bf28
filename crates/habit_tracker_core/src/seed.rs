//! crates/habit_tracker_core/src/seed.rs
//!
//! Default reminders created the first time an owner connects with no data.

use chrono::{DateTime, Utc, Weekday};
use uuid::Uuid;

use crate::domain::{AudioCategory, Owner, RecurrenceRule, Reminder, TimeOfDay};

struct SeedReminder {
    title: &'static str,
    message: &'static str,
    time: TimeOfDay,
    rule: RecurrenceRule,
    category: &'static str,
    audio_category: AudioCategory,
    play_audio: bool,
}

const DEFAULTS: [SeedReminder; 7] = [
    SeedReminder {
        title: "Quran Study Time",
        message: "Time to read and memorize Quran verses 📖",
        time: TimeOfDay { hour: 7, minute: 0 },
        rule: RecurrenceRule::Daily,
        category: "Spiritual",
        audio_category: AudioCategory::QuranStudy,
        play_audio: true,
    },
    SeedReminder {
        title: "Call Mom",
        message: "Remember to call your mother and check on her 📞",
        time: TimeOfDay { hour: 19, minute: 0 },
        rule: RecurrenceRule::Daily,
        category: "Family",
        audio_category: AudioCategory::Family,
        play_audio: true,
    },
    SeedReminder {
        title: "Exercise Time",
        message: "Time for your daily exercise routine 💪",
        time: TimeOfDay { hour: 6, minute: 0 },
        rule: RecurrenceRule::Daily,
        category: "Health",
        audio_category: AudioCategory::General,
        play_audio: false,
    },
    SeedReminder {
        title: "Computer Break",
        message: "Take a break from the computer and rest your eyes 👀",
        time: TimeOfDay { hour: 14, minute: 0 },
        rule: RecurrenceRule::Daily,
        category: "Health",
        audio_category: AudioCategory::General,
        play_audio: false,
    },
    SeedReminder {
        title: "Monday Fasting",
        message: "Today is Monday - time for Sunnah fasting 🌙",
        time: TimeOfDay { hour: 5, minute: 0 },
        rule: RecurrenceRule::Weekly(Weekday::Mon),
        category: "Spiritual",
        audio_category: AudioCategory::Prayer,
        play_audio: true,
    },
    SeedReminder {
        title: "Thursday Fasting",
        message: "Today is Thursday - time for Sunnah fasting 🌙",
        time: TimeOfDay { hour: 5, minute: 0 },
        rule: RecurrenceRule::Weekly(Weekday::Thu),
        category: "Spiritual",
        audio_category: AudioCategory::Prayer,
        play_audio: true,
    },
    SeedReminder {
        title: "Weekly Charity",
        message: "Time to give your weekly charity (Sadaqah) 💝",
        time: TimeOfDay { hour: 20, minute: 0 },
        rule: RecurrenceRule::Weekly(Weekday::Fri),
        category: "Charity",
        audio_category: AudioCategory::Charity,
        play_audio: true,
    },
];

/// Builds the default reminder set for a fresh owner.
pub fn default_reminders(owner: &Owner, now: DateTime<Utc>) -> Vec<Reminder> {
    DEFAULTS
        .iter()
        .map(|seed| Reminder {
            id: Uuid::new_v4(),
            owner: owner.clone(),
            title: seed.title.to_string(),
            message: seed.message.to_string(),
            time_of_day: Some(seed.time),
            rule: seed.rule,
            category: seed.category.to_string(),
            audio_category: seed.audio_category,
            play_audio: seed.play_audio,
            active: true,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_seven_active_reminders() {
        let owner = Owner::Device("fresh-device".to_string());
        let reminders = default_reminders(&owner, Utc::now());
        assert_eq!(reminders.len(), 7);
        assert!(reminders.iter().all(|r| r.active));
        assert!(reminders.iter().all(|r| r.owner == owner));
        assert!(reminders.iter().all(|r| r.time_of_day.is_some()));
    }

    #[test]
    fn seed_ids_are_unique() {
        let owner = Owner::Device("fresh-device".to_string());
        let reminders = default_reminders(&owner, Utc::now());
        let ids: std::collections::HashSet<_> = reminders.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), reminders.len());
    }

    #[test]
    fn fasting_seeds_are_weekly() {
        let owner = Owner::Device("fresh-device".to_string());
        let reminders = default_reminders(&owner, Utc::now());
        let monday = reminders.iter().find(|r| r.title == "Monday Fasting").unwrap();
        assert_eq!(monday.rule, RecurrenceRule::Weekly(Weekday::Mon));
        assert_eq!(monday.time_of_day, TimeOfDay::new(5, 0));
    }
}
