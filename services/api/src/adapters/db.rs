//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `HabitStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use habit_tracker_core::domain::{
    AudioCategory, Habit, HabitCheck, HabitFrequency, Owner, RecurrenceRule, Reminder,
    ReminderPatch, TimeOfDay, User, UserCredentials,
};
use habit_tracker_core::ports::{HabitStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `HabitStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Splits an [`Owner`] into the nullable column pair stored on every row.
fn owner_pair(owner: &Owner) -> (Option<Uuid>, Option<&str>) {
    match owner {
        Owner::User(user_id) => (Some(*user_id), None),
        Owner::Device(device_id) => (None, Some(device_id.as_str())),
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ReminderRecord {
    id: Uuid,
    user_id: Option<Uuid>,
    device_id: Option<String>,
    title: String,
    message: String,
    time: String,
    frequency: String,
    category: String,
    audio_category: String,
    play_audio: bool,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReminderRecord {
    fn to_domain(self) -> Reminder {
        let owner = match (self.user_id, self.device_id) {
            (Some(user_id), _) => Owner::User(user_id),
            (None, Some(device_id)) => Owner::Device(device_id),
            // Unreachable for well-formed rows; the schema enforces one owner.
            (None, None) => Owner::Device(String::new()),
        };
        Reminder {
            id: self.id,
            owner,
            title: self.title,
            message: self.message,
            // Malformed stored text becomes None, which is never due.
            time_of_day: TimeOfDay::parse(&self.time),
            rule: RecurrenceRule::parse(&self.frequency),
            category: self.category,
            audio_category: AudioCategory::parse(&self.audio_category),
            play_audio: self.play_audio,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct HabitRecord {
    id: Uuid,
    user_id: Option<Uuid>,
    device_id: Option<String>,
    name: String,
    description: String,
    category: String,
    frequency: String,
    streak: i32,
    target: i32,
    created_at: DateTime<Utc>,
}

impl HabitRecord {
    fn to_domain(self) -> Habit {
        let owner = match (self.user_id, self.device_id) {
            (Some(user_id), _) => Owner::User(user_id),
            (None, Some(device_id)) => Owner::Device(device_id),
            (None, None) => Owner::Device(String::new()),
        };
        Habit {
            id: self.id,
            owner,
            name: self.name,
            description: self.description,
            category: self.category,
            frequency: HabitFrequency::parse(&self.frequency),
            streak: self.streak.max(0) as u32,
            target: self.target.max(0) as u32,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CheckRecord {
    habit_id: Uuid,
    day: NaiveDate,
}

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: Option<String>,
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}

const REMINDER_COLUMNS: &str = "id, user_id, device_id, title, message, time, frequency, \
     category, audio_category, play_audio, active, created_at, updated_at";

const HABIT_COLUMNS: &str =
    "id, user_id, device_id, name, description, category, frequency, streak, target, created_at";

//=========================================================================================
// `HabitStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl HabitStore for PgStore {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(User {
            user_id: record.user_id,
            email: record.email,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;

        Ok(UserCredentials {
            user_id: record.user_id,
            email: record.email,
            hashed_password: record.hashed_password,
        })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Uuid = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => unexpected(e),
        })?;
        Ok(user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn adopt_device(&self, device_id: &str, user_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        sqlx::query("UPDATE reminders SET user_id = $1, device_id = NULL WHERE device_id = $2")
            .bind(user_id)
            .bind(device_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("UPDATE habits SET user_id = $1, device_id = NULL WHERE device_id = $2")
            .bind(user_id)
            .bind(device_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn reminders_for_owner(&self, owner: &Owner) -> PortResult<Vec<Reminder>> {
        let (user_id, device_id) = owner_pair(owner);
        let records = sqlx::query_as::<_, ReminderRecord>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders \
             WHERE user_id IS NOT DISTINCT FROM $1 AND device_id IS NOT DISTINCT FROM $2 \
             ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .bind(device_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_reminder(&self, reminder: Reminder) -> PortResult<Reminder> {
        let (user_id, device_id) = owner_pair(&reminder.owner);
        let time = reminder
            .time_of_day
            .map(|t| t.to_string())
            .unwrap_or_default();
        let record = sqlx::query_as::<_, ReminderRecord>(&format!(
            "INSERT INTO reminders \
             (id, user_id, device_id, title, message, time, frequency, category, \
              audio_category, play_audio, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {REMINDER_COLUMNS}"
        ))
        .bind(reminder.id)
        .bind(user_id)
        .bind(device_id)
        .bind(&reminder.title)
        .bind(&reminder.message)
        .bind(time)
        .bind(reminder.rule.to_string())
        .bind(&reminder.category)
        .bind(reminder.audio_category.label())
        .bind(reminder.play_audio)
        .bind(reminder.active)
        .bind(reminder.created_at)
        .bind(reminder.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn update_reminder(
        &self,
        id: Uuid,
        owner: &Owner,
        patch: ReminderPatch,
    ) -> PortResult<Reminder> {
        let (user_id, device_id) = owner_pair(owner);
        let record = sqlx::query_as::<_, ReminderRecord>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE id = $1 \
             AND user_id IS NOT DISTINCT FROM $2 AND device_id IS NOT DISTINCT FROM $3"
        ))
        .bind(id)
        .bind(user_id)
        .bind(device_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Reminder {} not found", id)),
            _ => unexpected(e),
        })?;

        let mut reminder = record.to_domain();
        patch.apply_to(&mut reminder);

        let time = reminder
            .time_of_day
            .map(|t| t.to_string())
            .unwrap_or_default();
        let record = sqlx::query_as::<_, ReminderRecord>(&format!(
            "UPDATE reminders SET title = $1, message = $2, time = $3, frequency = $4, \
             category = $5, audio_category = $6, play_audio = $7, active = $8, \
             updated_at = NOW() WHERE id = $9 RETURNING {REMINDER_COLUMNS}"
        ))
        .bind(&reminder.title)
        .bind(&reminder.message)
        .bind(time)
        .bind(reminder.rule.to_string())
        .bind(&reminder.category)
        .bind(reminder.audio_category.label())
        .bind(reminder.play_audio)
        .bind(reminder.active)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn delete_reminder(&self, id: Uuid, owner: &Owner) -> PortResult<()> {
        let (user_id, device_id) = owner_pair(owner);
        let result = sqlx::query(
            "DELETE FROM reminders WHERE id = $1 \
             AND user_id IS NOT DISTINCT FROM $2 AND device_id IS NOT DISTINCT FROM $3",
        )
        .bind(id)
        .bind(user_id)
        .bind(device_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Reminder {} not found", id)));
        }
        Ok(())
    }

    async fn habits_for_owner(&self, owner: &Owner) -> PortResult<Vec<Habit>> {
        let (user_id, device_id) = owner_pair(owner);
        let records = sqlx::query_as::<_, HabitRecord>(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits \
             WHERE user_id IS NOT DISTINCT FROM $1 AND device_id IS NOT DISTINCT FROM $2 \
             ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .bind(device_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_habit(&self, habit: Habit) -> PortResult<Habit> {
        let (user_id, device_id) = owner_pair(&habit.owner);
        let record = sqlx::query_as::<_, HabitRecord>(&format!(
            "INSERT INTO habits \
             (id, user_id, device_id, name, description, category, frequency, streak, target, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {HABIT_COLUMNS}"
        ))
        .bind(habit.id)
        .bind(user_id)
        .bind(device_id)
        .bind(&habit.name)
        .bind(&habit.description)
        .bind(&habit.category)
        .bind(habit.frequency.to_string())
        .bind(habit.streak as i32)
        .bind(habit.target as i32)
        .bind(habit.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn delete_habit(&self, id: Uuid, owner: &Owner) -> PortResult<()> {
        let (user_id, device_id) = owner_pair(owner);
        let result = sqlx::query(
            "DELETE FROM habits WHERE id = $1 \
             AND user_id IS NOT DISTINCT FROM $2 AND device_id IS NOT DISTINCT FROM $3",
        )
        .bind(id)
        .bind(user_id)
        .bind(device_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Habit {} not found", id)));
        }
        Ok(())
    }

    async fn set_habit_checked(
        &self,
        id: Uuid,
        owner: &Owner,
        day: NaiveDate,
        checked: bool,
    ) -> PortResult<Habit> {
        let (user_id, device_id) = owner_pair(owner);

        // Confirm the habit exists and belongs to the caller before touching
        // its checks.
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM habits WHERE id = $1 \
             AND user_id IS NOT DISTINCT FROM $2 AND device_id IS NOT DISTINCT FROM $3",
        )
        .bind(id)
        .bind(user_id)
        .bind(device_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Habit {} not found", id)),
            _ => unexpected(e),
        })?;

        if checked {
            let inserted = sqlx::query(
                "INSERT INTO habit_checks (habit_id, day) VALUES ($1, $2) \
                 ON CONFLICT (habit_id, day) DO NOTHING",
            )
            .bind(id)
            .bind(day)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

            // The streak only moves when the mark actually changed.
            if inserted.rows_affected() == 1 {
                sqlx::query("UPDATE habits SET streak = streak + 1 WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(unexpected)?;
            }
        } else {
            let deleted = sqlx::query("DELETE FROM habit_checks WHERE habit_id = $1 AND day = $2")
                .bind(id)
                .bind(day)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;

            if deleted.rows_affected() == 1 {
                sqlx::query("UPDATE habits SET streak = GREATEST(streak - 1, 0) WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(unexpected)?;
            }
        }

        let record = sqlx::query_as::<_, HabitRecord>(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn checks_in_range(
        &self,
        owner: &Owner,
        from: NaiveDate,
        to: NaiveDate,
    ) -> PortResult<Vec<HabitCheck>> {
        let (user_id, device_id) = owner_pair(owner);
        let records = sqlx::query_as::<_, CheckRecord>(
            "SELECT hc.habit_id, hc.day FROM habit_checks hc \
             JOIN habits h ON h.id = hc.habit_id \
             WHERE h.user_id IS NOT DISTINCT FROM $1 AND h.device_id IS NOT DISTINCT FROM $2 \
             AND hc.day BETWEEN $3 AND $4 \
             ORDER BY hc.day ASC",
        )
        .bind(user_id)
        .bind(device_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records
            .into_iter()
            .map(|r| HabitCheck {
                habit_id: r.habit_id,
                day: r.day,
            })
            .collect())
    }
}
