//! crates/habit_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or the
//! browser-facing notification channel.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AudioCategory, Habit, HabitCheck, Notification, Owner, Reminder, ReminderPatch, User,
    UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for reminders, habits and account data, keyed by [`Owner`].
#[async_trait]
pub trait HabitStore: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    /// Re-keys every row owned by the given device to the given user.
    /// Called once at signup so an anonymous browser keeps its data.
    async fn adopt_device(&self, device_id: &str, user_id: Uuid) -> PortResult<()>;

    // --- Reminder Management ---
    async fn reminders_for_owner(&self, owner: &Owner) -> PortResult<Vec<Reminder>>;

    async fn create_reminder(&self, reminder: Reminder) -> PortResult<Reminder>;

    /// Applies the patch to the owner's reminder and returns the updated row.
    async fn update_reminder(
        &self,
        id: Uuid,
        owner: &Owner,
        patch: ReminderPatch,
    ) -> PortResult<Reminder>;

    async fn delete_reminder(&self, id: Uuid, owner: &Owner) -> PortResult<()>;

    // --- Habit Management ---
    async fn habits_for_owner(&self, owner: &Owner) -> PortResult<Vec<Habit>>;

    async fn create_habit(&self, habit: Habit) -> PortResult<Habit>;

    async fn delete_habit(&self, id: Uuid, owner: &Owner) -> PortResult<()>;

    /// Marks or unmarks the habit as done on the given day, adjusts its
    /// streak, and returns the updated habit.
    async fn set_habit_checked(
        &self,
        id: Uuid,
        owner: &Owner,
        day: NaiveDate,
        checked: bool,
    ) -> PortResult<Habit>;

    /// All completion marks for the owner in the inclusive day range.
    async fn checks_in_range(
        &self,
        owner: &Owner,
        from: NaiveDate,
        to: NaiveDate,
    ) -> PortResult<Vec<HabitCheck>>;
}

/// Emits a user-visible notification when a reminder fires.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification) -> PortResult<()>;
}

/// Requests audio playback of a recitation for the given category.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(&self, category: AudioCategory, duration_ms: u64) -> PortResult<()>;
}

/// Supplies the current local wall-clock time.
///
/// Injected so the scheduler can be driven deterministically in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
