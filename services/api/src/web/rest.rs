//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{Duration, Utc};
use habit_tracker_core::domain::{
    AudioCategory, Habit, HabitFrequency, Owner, RecurrenceRule, Reminder, ReminderPatch,
    TimeOfDay,
};
use habit_tracker_core::ports::PortError;
use habit_tracker_core::{prayer, quotes, seed};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::auth;
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        list_reminders_handler,
        create_reminder_handler,
        update_reminder_handler,
        toggle_reminder_handler,
        delete_reminder_handler,
        list_habits_handler,
        create_habit_handler,
        delete_habit_handler,
        check_habit_handler,
        today_handler,
        progress_handler,
        list_quotes_handler,
        daily_quote_handler,
        prayer_times_handler,
    ),
    components(schemas(
        auth::SignupRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        ReminderDto,
        CreateReminderRequest,
        UpdateReminderRequest,
        HabitDto,
        CreateHabitRequest,
        CheckHabitRequest,
        TodayHabitDto,
        TodayResponse,
        DayProgressDto,
        AchievementDto,
        ProgressResponse,
        QuoteDto,
        EncouragementDto,
        QuotesResponse,
        PrayerDto,
        PrayerTimesResponse,
    )),
    tags(
        (name = "Habit Tracker API", description = "API endpoints for the Islamic habit and reminder tracker.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A reminder as returned by the REST API.
#[derive(Serialize, ToSchema)]
pub struct ReminderDto {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    /// `"HH:MM"`, or null when the stored time is malformed.
    pub time: Option<String>,
    pub frequency: String,
    pub category: String,
    pub audio_category: String,
    pub play_audio: bool,
    pub active: bool,
}

impl ReminderDto {
    fn from_domain(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id,
            title: reminder.title.clone(),
            message: reminder.message.clone(),
            time: reminder.time_of_day.map(|t| t.to_string()),
            frequency: reminder.rule.to_string(),
            category: reminder.category.clone(),
            audio_category: reminder.audio_category.label().to_string(),
            play_audio: reminder.play_audio,
            active: reminder.active,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateReminderRequest {
    pub title: String,
    pub message: String,
    /// `"HH:MM"`, 24-hour.
    pub time: String,
    pub frequency: String,
    pub category: String,
    pub audio_category: String,
    #[serde(default = "default_true")]
    pub play_audio: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateReminderRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    pub time: Option<String>,
    pub frequency: Option<String>,
    pub category: Option<String>,
    pub audio_category: Option<String>,
    pub play_audio: Option<bool>,
    pub active: Option<bool>,
}

/// A habit as returned by the REST API.
#[derive(Serialize, ToSchema)]
pub struct HabitDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub frequency: String,
    pub streak: u32,
    pub target: u32,
}

impl HabitDto {
    fn from_domain(habit: &Habit) -> Self {
        Self {
            id: habit.id,
            name: habit.name.clone(),
            description: habit.description.clone(),
            category: habit.category.clone(),
            frequency: habit.frequency.to_string(),
            streak: habit.streak,
            target: habit.target,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub frequency: String,
    #[serde(default = "default_target")]
    pub target: u32,
}

fn default_target() -> u32 {
    30
}

#[derive(Deserialize, ToSchema)]
pub struct CheckHabitRequest {
    /// True to mark the habit done today, false to undo the mark.
    pub done: bool,
}

/// One entry of today's checklist.
#[derive(Serialize, ToSchema)]
pub struct TodayHabitDto {
    pub id: Uuid,
    pub name: String,
    pub streak: u32,
    pub completed: bool,
}

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    pub habits: Vec<TodayHabitDto>,
    pub completed: usize,
    pub total: usize,
}

/// Completion count for one day of the progress window.
#[derive(Serialize, ToSchema)]
pub struct DayProgressDto {
    /// `YYYY-MM-DD`.
    pub day: String,
    pub completed: usize,
}

#[derive(Serialize, ToSchema)]
pub struct AchievementDto {
    pub title: String,
    pub description: String,
    pub earned: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ProgressResponse {
    pub days: Vec<DayProgressDto>,
    pub achievements: Vec<AchievementDto>,
}

#[derive(Serialize, ToSchema)]
pub struct QuoteDto {
    pub text: String,
    pub reference: String,
    pub arabic: String,
}

impl QuoteDto {
    fn from_catalog(quote: &quotes::Quote) -> Self {
        Self {
            text: quote.text.to_string(),
            reference: quote.reference.to_string(),
            arabic: quote.arabic.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct EncouragementDto {
    pub title: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct QuotesResponse {
    pub quotes: Vec<QuoteDto>,
    pub encouragements: Vec<EncouragementDto>,
}

#[derive(Serialize, ToSchema)]
pub struct PrayerDto {
    pub name: String,
    pub time: String,
}

#[derive(Serialize, ToSchema)]
pub struct PrayerTimesResponse {
    pub prayers: Vec<PrayerDto>,
    pub current: String,
    pub next: String,
}

/// Streak milestones shown on the progress page.
const ACHIEVEMENTS: [(&str, &str, u32); 5] = [
    ("7-Day Streak", "Keep any habit alive for 7 days straight", 7),
    ("Family First", "Two weeks of an unbroken family habit", 14),
    ("Early Bird", "Wake up on time for 21 days", 21),
    ("Consistent Giver", "Give charity for 4 weeks in a row", 28),
    ("30-Day Challenge", "Complete a habit for 30 days", 30),
];

fn port_error_response(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(message) => {
            error!("Store operation failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

//=========================================================================================
// Reminder Handlers
//=========================================================================================

/// List the owner's reminders, seeding the default set on first contact.
#[utoipa::path(
    get,
    path = "/reminders",
    responses(
        (status = 200, description = "The owner's reminders", body = [ReminderDto]),
        (status = 401, description = "No user session or device id")
    )
)]
pub async fn list_reminders_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut reminders = app_state
        .store
        .reminders_for_owner(&owner)
        .await
        .map_err(port_error_response)?;

    // A fresh owner starts with the default reminder set, matching the
    // first-run behavior of the browser app.
    if reminders.is_empty() {
        for seeded in seed::default_reminders(&owner, Utc::now()) {
            let created = app_state
                .store
                .create_reminder(seeded)
                .await
                .map_err(port_error_response)?;
            reminders.push(created);
        }
    }

    let dtos: Vec<ReminderDto> = reminders.iter().map(ReminderDto::from_domain).collect();
    Ok(Json(dtos))
}

/// Create a new reminder.
#[utoipa::path(
    post,
    path = "/reminders",
    request_body = CreateReminderRequest,
    responses(
        (status = 201, description = "Reminder created", body = ReminderDto),
        (status = 400, description = "Missing title or message"),
        (status = 401, description = "No user session or device id")
    )
)]
pub async fn create_reminder_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Json(req): Json<CreateReminderRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.title.trim().is_empty() || req.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "A reminder needs both a title and a message".to_string(),
        ));
    }

    let now = Utc::now();
    let reminder = Reminder {
        id: Uuid::new_v4(),
        owner: owner.clone(),
        title: req.title,
        message: req.message,
        time_of_day: TimeOfDay::parse(&req.time),
        rule: RecurrenceRule::parse(&req.frequency),
        category: req.category,
        audio_category: AudioCategory::parse(&req.audio_category),
        play_audio: req.play_audio,
        active: true,
        created_at: now,
        updated_at: now,
    };

    let created = app_state
        .store
        .create_reminder(reminder)
        .await
        .map_err(port_error_response)?;
    app_state.bump_revision(&owner).await;

    Ok((StatusCode::CREATED, Json(ReminderDto::from_domain(&created))))
}

/// Update a reminder's fields.
#[utoipa::path(
    put,
    path = "/reminders/{id}",
    request_body = UpdateReminderRequest,
    responses(
        (status = 200, description = "Reminder updated", body = ReminderDto),
        (status = 404, description = "Reminder not found"),
        (status = 401, description = "No user session or device id")
    ),
    params(("id" = Uuid, Path, description = "The reminder to update."))
)]
pub async fn update_reminder_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReminderRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let patch = ReminderPatch {
        title: req.title,
        message: req.message,
        time_of_day: req.time.map(|t| TimeOfDay::parse(&t)),
        rule: req.frequency.map(|f| RecurrenceRule::parse(&f)),
        category: req.category,
        audio_category: req.audio_category.map(|a| AudioCategory::parse(&a)),
        play_audio: req.play_audio,
        active: req.active,
    };

    let updated = app_state
        .store
        .update_reminder(id, &owner, patch)
        .await
        .map_err(port_error_response)?;
    app_state.bump_revision(&owner).await;

    Ok(Json(ReminderDto::from_domain(&updated)))
}

/// Flip a reminder's active flag.
#[utoipa::path(
    post,
    path = "/reminders/{id}/toggle",
    responses(
        (status = 200, description = "Reminder toggled", body = ReminderDto),
        (status = 404, description = "Reminder not found"),
        (status = 401, description = "No user session or device id")
    ),
    params(("id" = Uuid, Path, description = "The reminder to toggle."))
)]
pub async fn toggle_reminder_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let reminders = app_state
        .store
        .reminders_for_owner(&owner)
        .await
        .map_err(port_error_response)?;
    let current = reminders
        .iter()
        .find(|r| r.id == id)
        .ok_or((StatusCode::NOT_FOUND, format!("Reminder {} not found", id)))?;

    let patch = ReminderPatch {
        active: Some(!current.active),
        ..Default::default()
    };
    let updated = app_state
        .store
        .update_reminder(id, &owner, patch)
        .await
        .map_err(port_error_response)?;
    app_state.bump_revision(&owner).await;

    Ok(Json(ReminderDto::from_domain(&updated)))
}

/// Delete a reminder.
#[utoipa::path(
    delete,
    path = "/reminders/{id}",
    responses(
        (status = 204, description = "Reminder deleted"),
        (status = 404, description = "Reminder not found"),
        (status = 401, description = "No user session or device id")
    ),
    params(("id" = Uuid, Path, description = "The reminder to delete."))
)]
pub async fn delete_reminder_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .store
        .delete_reminder(id, &owner)
        .await
        .map_err(port_error_response)?;
    app_state.bump_revision(&owner).await;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Habit Handlers
//=========================================================================================

/// List the owner's habits.
#[utoipa::path(
    get,
    path = "/habits",
    responses(
        (status = 200, description = "The owner's habits", body = [HabitDto]),
        (status = 401, description = "No user session or device id")
    )
)]
pub async fn list_habits_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let habits = app_state
        .store
        .habits_for_owner(&owner)
        .await
        .map_err(port_error_response)?;
    let dtos: Vec<HabitDto> = habits.iter().map(HabitDto::from_domain).collect();
    Ok(Json(dtos))
}

/// Create a new habit.
#[utoipa::path(
    post,
    path = "/habits",
    request_body = CreateHabitRequest,
    responses(
        (status = 201, description = "Habit created", body = HabitDto),
        (status = 400, description = "Missing habit name"),
        (status = 401, description = "No user session or device id")
    )
)]
pub async fn create_habit_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Json(req): Json<CreateHabitRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "A habit needs a name".to_string(),
        ));
    }

    let habit = Habit {
        id: Uuid::new_v4(),
        owner,
        name: req.name,
        description: req.description,
        category: req.category,
        frequency: HabitFrequency::parse(&req.frequency),
        streak: 0,
        target: req.target,
        created_at: Utc::now(),
    };

    let created = app_state
        .store
        .create_habit(habit)
        .await
        .map_err(port_error_response)?;
    Ok((StatusCode::CREATED, Json(HabitDto::from_domain(&created))))
}

/// Delete a habit and its history.
#[utoipa::path(
    delete,
    path = "/habits/{id}",
    responses(
        (status = 204, description = "Habit deleted"),
        (status = 404, description = "Habit not found"),
        (status = 401, description = "No user session or device id")
    ),
    params(("id" = Uuid, Path, description = "The habit to delete."))
)]
pub async fn delete_habit_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .store
        .delete_habit(id, &owner)
        .await
        .map_err(port_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark or unmark a habit as done today.
#[utoipa::path(
    post,
    path = "/habits/{id}/check",
    request_body = CheckHabitRequest,
    responses(
        (status = 200, description = "Habit check recorded", body = HabitDto),
        (status = 404, description = "Habit not found"),
        (status = 401, description = "No user session or device id")
    ),
    params(("id" = Uuid, Path, description = "The habit to check off."))
)]
pub async fn check_habit_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Json(req): Json<CheckHabitRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = app_state.clock.now().date();
    let updated = app_state
        .store
        .set_habit_checked(id, &owner, today, req.done)
        .await
        .map_err(port_error_response)?;
    Ok(Json(HabitDto::from_domain(&updated)))
}

/// Today's checklist with completion flags.
#[utoipa::path(
    get,
    path = "/habits/today",
    responses(
        (status = 200, description = "Today's checklist", body = TodayResponse),
        (status = 401, description = "No user session or device id")
    )
)]
pub async fn today_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = app_state.clock.now().date();
    let habits = app_state
        .store
        .habits_for_owner(&owner)
        .await
        .map_err(port_error_response)?;
    let checked: HashSet<Uuid> = app_state
        .store
        .checks_in_range(&owner, today, today)
        .await
        .map_err(port_error_response)?
        .into_iter()
        .map(|check| check.habit_id)
        .collect();

    let entries: Vec<TodayHabitDto> = habits
        .iter()
        .map(|habit| TodayHabitDto {
            id: habit.id,
            name: habit.name.clone(),
            streak: habit.streak,
            completed: checked.contains(&habit.id),
        })
        .collect();
    let completed = entries.iter().filter(|h| h.completed).count();
    let total = entries.len();

    Ok(Json(TodayResponse {
        habits: entries,
        completed,
        total,
    }))
}

/// Completion counts for the last seven days plus achievement states.
#[utoipa::path(
    get,
    path = "/progress",
    responses(
        (status = 200, description = "Weekly progress", body = ProgressResponse),
        (status = 401, description = "No user session or device id")
    )
)]
pub async fn progress_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = app_state.clock.now().date();
    let from = today - Duration::days(6);

    let habits = app_state
        .store
        .habits_for_owner(&owner)
        .await
        .map_err(port_error_response)?;
    let checks = app_state
        .store
        .checks_in_range(&owner, from, today)
        .await
        .map_err(port_error_response)?;

    let days: Vec<DayProgressDto> = (0..7)
        .map(|offset| {
            let day = from + Duration::days(offset);
            DayProgressDto {
                day: day.format("%Y-%m-%d").to_string(),
                completed: checks.iter().filter(|check| check.day == day).count(),
            }
        })
        .collect();

    let best_streak = habits.iter().map(|habit| habit.streak).max().unwrap_or(0);
    let achievements = ACHIEVEMENTS
        .iter()
        .map(|(title, description, required)| AchievementDto {
            title: title.to_string(),
            description: description.to_string(),
            earned: best_streak >= *required,
        })
        .collect();

    Ok(Json(ProgressResponse { days, achievements }))
}

//=========================================================================================
// Quote and Prayer Handlers
//=========================================================================================

/// The full quote catalog and motivational messages.
#[utoipa::path(
    get,
    path = "/quotes",
    responses((status = 200, description = "The quote catalog", body = QuotesResponse))
)]
pub async fn list_quotes_handler() -> impl IntoResponse {
    let response = QuotesResponse {
        quotes: quotes::QUOTES.iter().map(QuoteDto::from_catalog).collect(),
        encouragements: quotes::ENCOURAGEMENTS
            .iter()
            .map(|e| EncouragementDto {
                title: e.title.to_string(),
                message: e.message.to_string(),
            })
            .collect(),
    };
    Json(response)
}

/// Today's quote from the daily rotation.
#[utoipa::path(
    get,
    path = "/quotes/daily",
    responses((status = 200, description = "Today's quote", body = QuoteDto))
)]
pub async fn daily_quote_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let today = app_state.clock.now().date();
    Json(QuoteDto::from_catalog(quotes::daily(today)))
}

/// The prayer timetable with the current and next prayer.
#[utoipa::path(
    get,
    path = "/prayer-times",
    responses((status = 200, description = "The prayer timetable", body = PrayerTimesResponse))
)]
pub async fn prayer_times_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = TimeOfDay::from_time(app_state.clock.now().time());
    let (current, next) = prayer::current_and_next(now);

    let prayers = prayer::TIMETABLE
        .iter()
        .map(|p| PrayerDto {
            name: p.name.to_string(),
            time: p.time.to_string(),
        })
        .collect();

    Json(PrayerTimesResponse {
        prayers,
        current: current.to_string(),
        next: next.to_string(),
    })
}
