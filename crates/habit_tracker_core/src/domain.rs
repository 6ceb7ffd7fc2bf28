//! crates/habit_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use uuid::Uuid;

/// Identifies who a reminder or habit belongs to.
///
/// Anonymous browsers are keyed by a locally generated device identifier;
/// signed-in users by their account id. A stored row always has exactly one
/// of the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    User(Uuid),
    Device(String),
}

/// A wall-clock time of day with no date component.
///
/// Parsing is lenient by design: reminder times arrive as `"HH:MM"` text
/// from clients and the database, and a value that does not parse must make
/// the reminder silently ineligible rather than raise an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Parses `"HH:MM"` (24-hour). Returns `None` for anything malformed.
    pub fn parse(text: &str) -> Option<Self> {
        let (h, m) = text.trim().split_once(':')?;
        let hour: u8 = h.parse().ok()?;
        let minute: u8 = m.parse().ok()?;
        Self::new(hour, minute)
    }

    /// The minute the given clock reading falls in.
    pub fn from_time(time: NaiveTime) -> Self {
        use chrono::Timelike;
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Which calendar days a reminder is eligible to fire on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// Eligible every calendar day.
    Daily,
    /// Eligible only on the given weekday.
    Weekly(Weekday),
    /// Recognised but never eligible. Covers frequency labels the source
    /// offered without any trigger logic behind them.
    Custom,
}

impl RecurrenceRule {
    /// Maps the stored frequency label to a rule. Unknown labels become
    /// `Custom` so bad data disables a reminder instead of failing.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Daily" => Self::Daily,
            "Weekly (Monday)" => Self::Weekly(Weekday::Mon),
            "Weekly (Tuesday)" => Self::Weekly(Weekday::Tue),
            "Weekly (Wednesday)" => Self::Weekly(Weekday::Wed),
            "Weekly (Thursday)" => Self::Weekly(Weekday::Thu),
            "Weekly (Friday)" => Self::Weekly(Weekday::Fri),
            "Weekly (Saturday)" => Self::Weekly(Weekday::Sat),
            "Weekly (Sunday)" => Self::Weekly(Weekday::Sun),
            _ => Self::Custom,
        }
    }

    pub fn applies_on(&self, weekday: Weekday) -> bool {
        match self {
            Self::Daily => true,
            Self::Weekly(day) => *day == weekday,
            Self::Custom => false,
        }
    }

    fn weekday_label(day: Weekday) -> &'static str {
        match day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

impl std::fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly(day) => write!(f, "Weekly ({})", Self::weekday_label(*day)),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

/// The recitation family played when a reminder fires with audio enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCategory {
    QuranStudy,
    Prayer,
    Charity,
    Family,
    General,
}

impl AudioCategory {
    /// Lenient label mapping; unknown labels fall back to `General`, the
    /// source default.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "quranStudy" => Self::QuranStudy,
            "prayer" => Self::Prayer,
            "charity" => Self::Charity,
            "family" => Self::Family,
            _ => Self::General,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::QuranStudy => "quranStudy",
            Self::Prayer => "prayer",
            Self::Charity => "charity",
            Self::Family => "family",
            Self::General => "general",
        }
    }
}

/// One configured recurring alert.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub id: Uuid,
    pub owner: Owner,
    pub title: String,
    pub message: String,
    /// `None` when the stored time text was malformed; such a reminder is
    /// never due.
    pub time_of_day: Option<TimeOfDay>,
    pub rule: RecurrenceRule,
    /// Display grouping (Spiritual, Health, ...). Opaque to the scheduler.
    pub category: String,
    pub audio_category: AudioCategory,
    pub play_audio: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A partial update to a reminder. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ReminderPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    pub time_of_day: Option<Option<TimeOfDay>>,
    pub rule: Option<RecurrenceRule>,
    pub category: Option<String>,
    pub audio_category: Option<AudioCategory>,
    pub play_audio: Option<bool>,
    pub active: Option<bool>,
}

impl ReminderPatch {
    /// Whether applying this patch must invalidate the scheduler's firing
    /// memory. Audio and text changes do not touch the schedule.
    pub fn affects_schedule(&self) -> bool {
        self.time_of_day.is_some() || self.rule.is_some() || self.active.is_some()
    }

    pub fn apply_to(&self, reminder: &mut Reminder) {
        if let Some(title) = &self.title {
            reminder.title = title.clone();
        }
        if let Some(message) = &self.message {
            reminder.message = message.clone();
        }
        if let Some(time) = self.time_of_day {
            reminder.time_of_day = time;
        }
        if let Some(rule) = self.rule {
            reminder.rule = rule;
        }
        if let Some(category) = &self.category {
            reminder.category = category.clone();
        }
        if let Some(audio) = self.audio_category {
            reminder.audio_category = audio;
        }
        if let Some(play_audio) = self.play_audio {
            reminder.play_audio = play_audio;
        }
        if let Some(active) = self.active {
            reminder.active = active;
        }
    }
}

/// How often a habit is meant to be practised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl HabitFrequency {
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Weekly" => Self::Weekly,
            "Monthly" => Self::Monthly,
            _ => Self::Daily,
        }
    }
}

impl std::fmt::Display for HabitFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
            Self::Monthly => write!(f, "Monthly"),
        }
    }
}

/// A recurring good deed the user is building consistency in.
#[derive(Debug, Clone)]
pub struct Habit {
    pub id: Uuid,
    pub owner: Owner,
    pub name: String,
    pub description: String,
    pub category: String,
    pub frequency: HabitFrequency,
    /// Consecutive completions so far.
    pub streak: u32,
    /// The completion count the user is aiming for.
    pub target: u32,
    pub created_at: DateTime<Utc>,
}

/// One completion mark for a habit on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitCheck {
    pub habit_id: Uuid,
    pub day: NaiveDate,
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
}

/// The payload handed to the notification sink when a reminder fires.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
