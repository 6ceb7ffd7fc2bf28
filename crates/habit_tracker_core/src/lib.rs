pub mod domain;
pub mod ports;
pub mod prayer;
pub mod quotes;
pub mod scheduler;
pub mod seed;

pub use domain::{
    AudioCategory, AuthSession, Habit, HabitCheck, HabitFrequency, Notification, Owner,
    RecurrenceRule, Reminder, ReminderPatch, Severity, TimeOfDay, User, UserCredentials,
};
pub use ports::{AudioSink, Clock, HabitStore, NotificationSink, PortError, PortResult};
pub use scheduler::{FiredKey, Firing, ReminderScheduler};
