//! Integration tests for the habit tracker API.
//!
//! Each test drives the real router over an in-memory store double, so the
//! handlers, middleware and scheduler wiring are exercised without a
//! database. Requests are issued with `tower::ServiceExt::oneshot`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use api_lib::adapters::RecitationLibrary;
use api_lib::config::Config;
use api_lib::web::state::{AppState, SessionState};
use api_lib::web::watch_task::reminder_watch_process;
use api_lib::web::build_router;
use habit_tracker_core::domain::{
    AudioCategory, Habit, HabitCheck, Notification, Owner, Reminder, ReminderPatch, User,
    UserCredentials,
};
use habit_tracker_core::ports::{
    AudioSink, Clock, HabitStore, NotificationSink, PortError, PortResult,
};

// =============================================================================
// Test doubles
// =============================================================================

/// A `Clock` pinned to a fixed instant.
struct FixedClock(NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Default)]
struct StoreInner {
    users: HashMap<Uuid, UserCredentials>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    reminders: Vec<Reminder>,
    habits: Vec<Habit>,
    checks: HashSet<(Uuid, NaiveDate)>,
}

/// An in-memory `HabitStore` double.
#[derive(Default)]
struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

#[async_trait]
impl HabitStore for InMemoryStore {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        let user_id = Uuid::new_v4();
        inner.users.insert(
            user_id,
            UserCredentials {
                user_id,
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(User {
            user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .values()
            .find(|creds| creds.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let inner = self.inner.lock().unwrap();
        match inner.sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.remove(session_id);
        Ok(())
    }

    async fn adopt_device(&self, device_id: &str, user_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let device = Owner::Device(device_id.to_string());
        for reminder in inner.reminders.iter_mut() {
            if reminder.owner == device {
                reminder.owner = Owner::User(user_id);
            }
        }
        for habit in inner.habits.iter_mut() {
            if habit.owner == device {
                habit.owner = Owner::User(user_id);
            }
        }
        Ok(())
    }

    async fn reminders_for_owner(&self, owner: &Owner) -> PortResult<Vec<Reminder>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reminders
            .iter()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect())
    }

    async fn create_reminder(&self, reminder: Reminder) -> PortResult<Reminder> {
        let mut inner = self.inner.lock().unwrap();
        inner.reminders.push(reminder.clone());
        Ok(reminder)
    }

    async fn update_reminder(
        &self,
        id: Uuid,
        owner: &Owner,
        patch: ReminderPatch,
    ) -> PortResult<Reminder> {
        let mut inner = self.inner.lock().unwrap();
        let reminder = inner
            .reminders
            .iter_mut()
            .find(|r| r.id == id && &r.owner == owner)
            .ok_or_else(|| PortError::NotFound(format!("Reminder {} not found", id)))?;
        patch.apply_to(reminder);
        reminder.updated_at = Utc::now();
        Ok(reminder.clone())
    }

    async fn delete_reminder(&self, id: Uuid, owner: &Owner) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.reminders.len();
        inner.reminders.retain(|r| !(r.id == id && &r.owner == owner));
        if inner.reminders.len() == before {
            return Err(PortError::NotFound(format!("Reminder {} not found", id)));
        }
        Ok(())
    }

    async fn habits_for_owner(&self, owner: &Owner) -> PortResult<Vec<Habit>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .habits
            .iter()
            .filter(|h| &h.owner == owner)
            .cloned()
            .collect())
    }

    async fn create_habit(&self, habit: Habit) -> PortResult<Habit> {
        let mut inner = self.inner.lock().unwrap();
        inner.habits.push(habit.clone());
        Ok(habit)
    }

    async fn delete_habit(&self, id: Uuid, owner: &Owner) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.habits.len();
        inner.habits.retain(|h| !(h.id == id && &h.owner == owner));
        if inner.habits.len() == before {
            return Err(PortError::NotFound(format!("Habit {} not found", id)));
        }
        inner.checks.retain(|(habit_id, _)| *habit_id != id);
        Ok(())
    }

    async fn set_habit_checked(
        &self,
        id: Uuid,
        owner: &Owner,
        day: NaiveDate,
        checked: bool,
    ) -> PortResult<Habit> {
        let mut inner = self.inner.lock().unwrap();
        let exists = inner
            .habits
            .iter()
            .any(|h| h.id == id && &h.owner == owner);
        if !exists {
            return Err(PortError::NotFound(format!("Habit {} not found", id)));
        }

        let changed = if checked {
            inner.checks.insert((id, day))
        } else {
            inner.checks.remove(&(id, day))
        };

        let habit = inner
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .expect("habit disappeared");
        if changed {
            if checked {
                habit.streak += 1;
            } else {
                habit.streak = habit.streak.saturating_sub(1);
            }
        }
        Ok(habit.clone())
    }

    async fn checks_in_range(
        &self,
        owner: &Owner,
        from: NaiveDate,
        to: NaiveDate,
    ) -> PortResult<Vec<HabitCheck>> {
        let inner = self.inner.lock().unwrap();
        let owned: HashSet<Uuid> = inner
            .habits
            .iter()
            .filter(|h| &h.owner == owner)
            .map(|h| h.id)
            .collect();
        Ok(inner
            .checks
            .iter()
            .filter(|(habit_id, day)| owned.contains(habit_id) && *day >= from && *day <= to)
            .map(|(habit_id, day)| HabitCheck {
                habit_id: *habit_id,
                day: *day,
            })
            .collect())
    }
}

/// Records every notification it is handed.
#[derive(Default)]
struct RecordingNotifications(Mutex<Vec<Notification>>);

#[async_trait]
impl NotificationSink for RecordingNotifications {
    async fn notify(&self, notification: &Notification) -> PortResult<()> {
        self.0.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Records every audio cue it is handed.
#[derive(Default)]
struct RecordingAudio(Mutex<Vec<(AudioCategory, u64)>>);

#[async_trait]
impl AudioSink for RecordingAudio {
    async fn play(&self, category: AudioCategory, duration_ms: u64) -> PortResult<()> {
        self.0.lock().unwrap().push((category, duration_ms));
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

const DEVICE: &str = "device_test_abc123";

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        reminder_poll: Duration::from_millis(20),
        audio_duration_ms: 8000,
        recitation_base_url: "https://recitations.test/voice".to_string(),
    }
}

fn fixed_now() -> NaiveDateTime {
    // 2024-01-01 is a Monday.
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(7, 0, 0)
        .unwrap()
}

fn make_state() -> Arc<AppState> {
    make_state_at(fixed_now())
}

fn make_state_at(now: NaiveDateTime) -> Arc<AppState> {
    let config = Arc::new(test_config());
    let recitations = Arc::new(RecitationLibrary::new(config.recitation_base_url.clone()));
    Arc::new(AppState::new(
        Arc::new(InMemoryStore::default()),
        config,
        recitations,
        Arc::new(FixedClock(now)),
    ))
}

fn make_app() -> axum::Router {
    build_router(make_state())
}

/// Build a GET request scoped to the test device.
fn device_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-device-id", DEVICE)
        .body(Body::empty())
        .unwrap()
}

/// Build a POST request scoped to the test device with a JSON body.
fn device_post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("x-device-id", DEVICE)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn device_put_json(uri: &str, body: Value) -> Request<Body> {
    Request::put(uri)
        .header("x-device-id", DEVICE)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn device_delete(uri: &str) -> Request<Body> {
    Request::delete(uri)
        .header("x-device-id", DEVICE)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Owner resolution
// =============================================================================

#[tokio::test]
async fn data_routes_require_an_owner() {
    let app = make_app();
    let response = app
        .oneshot(Request::get("/reminders").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_routes_need_no_owner() {
    let app = make_app();
    let response = app
        .oneshot(Request::get("/prayer-times").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Reminders
// =============================================================================

#[tokio::test]
async fn first_contact_seeds_the_default_reminders() {
    let app = make_app();
    let response = app.oneshot(device_get("/reminders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let reminders = body.as_array().unwrap();
    assert_eq!(reminders.len(), 7);
    assert!(reminders.iter().all(|r| r["active"] == json!(true)));
    assert!(reminders
        .iter()
        .any(|r| r["title"] == json!("Quran Study Time") && r["time"] == json!("07:00")));
}

#[tokio::test]
async fn created_reminders_show_up_in_the_list() {
    let app = make_app();

    let response = app
        .clone()
        .oneshot(device_post_json(
            "/reminders",
            json!({
                "title": "Evening Dhikr",
                "message": "Time for evening remembrance",
                "time": "21:30",
                "frequency": "Daily",
                "category": "Spiritual",
                "audio_category": "general"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["time"], json!("21:30"));
    assert_eq!(created["play_audio"], json!(true));

    let response = app.oneshot(device_get("/reminders")).await.unwrap();
    let body = json_body(response).await;
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["title"] == json!("Evening Dhikr")));
}

#[tokio::test]
async fn blank_titles_are_rejected() {
    let app = make_app();
    let response = app
        .oneshot(device_post_json(
            "/reminders",
            json!({
                "title": "   ",
                "message": "no title here",
                "time": "09:00",
                "frequency": "Daily",
                "category": "Health",
                "audio_category": "general"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn toggling_flips_the_active_flag() {
    let app = make_app();

    let response = app.clone().oneshot(device_get("/reminders")).await.unwrap();
    let body = json_body(response).await;
    let id = body[0]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(device_post_json(
            &format!("/reminders/{id}/toggle"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let toggled = json_body(response).await;
    assert_eq!(toggled["active"], json!(false));

    let response = app
        .oneshot(device_post_json(
            &format!("/reminders/{id}/toggle"),
            json!({}),
        ))
        .await
        .unwrap();
    let toggled = json_body(response).await;
    assert_eq!(toggled["active"], json!(true));
}

#[tokio::test]
async fn editing_a_reminder_changes_its_time() {
    let app = make_app();

    let response = app.clone().oneshot(device_get("/reminders")).await.unwrap();
    let body = json_body(response).await;
    let id = body[0]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(device_put_json(
            &format!("/reminders/{id}"),
            json!({ "time": "07:05" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["time"], json!("07:05"));
}

#[tokio::test]
async fn a_malformed_time_is_stored_as_unset() {
    let app = make_app();

    let response = app.clone().oneshot(device_get("/reminders")).await.unwrap();
    let body = json_body(response).await;
    let id = body[0]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(device_put_json(
            &format!("/reminders/{id}"),
            json!({ "time": "half past nine" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["time"], Value::Null);
}

#[tokio::test]
async fn deleting_a_reminder_removes_it() {
    let app = make_app();

    let response = app
        .clone()
        .oneshot(device_post_json(
            "/reminders",
            json!({
                "title": "Temporary",
                "message": "Will be deleted",
                "time": "10:00",
                "frequency": "Daily",
                "category": "Health",
                "audio_category": "general"
            }),
        ))
        .await
        .unwrap();
    let created = json_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(device_delete(&format!("/reminders/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(device_get("/reminders")).await.unwrap();
    let body = json_body(response).await;
    assert!(!body
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"] == json!(id)));
}

#[tokio::test]
async fn owners_do_not_see_each_other() {
    let app = make_app();

    // Both devices get their own seeded set.
    let response = app.clone().oneshot(device_get("/reminders")).await.unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 7);

    let other = Request::get("/reminders")
        .header("x-device-id", "device_other")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(other).await.unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 7);

    // A reminder added by one device stays invisible to the other.
    app.clone()
        .oneshot(device_post_json(
            "/reminders",
            json!({
                "title": "Mine only",
                "message": "Scoped to one device",
                "time": "11:00",
                "frequency": "Daily",
                "category": "Learning",
                "audio_category": "general"
            }),
        ))
        .await
        .unwrap();

    let other = Request::get("/reminders")
        .header("x-device-id", "device_other")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(other).await.unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 7);
}

// =============================================================================
// Habits
// =============================================================================

#[tokio::test]
async fn checking_a_habit_bumps_its_streak() {
    let app = make_app();

    let response = app
        .clone()
        .oneshot(device_post_json(
            "/habits",
            json!({
                "name": "Study Quran & Memorize Ayats",
                "category": "Spiritual",
                "frequency": "Daily"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let habit = json_body(response).await;
    let id = habit["id"].as_str().unwrap().to_string();
    assert_eq!(habit["streak"], json!(0));
    assert_eq!(habit["target"], json!(30));

    let response = app
        .clone()
        .oneshot(device_post_json(
            &format!("/habits/{id}/check"),
            json!({ "done": true }),
        ))
        .await
        .unwrap();
    let habit = json_body(response).await;
    assert_eq!(habit["streak"], json!(1));

    // Checking the same day again changes nothing.
    let response = app
        .clone()
        .oneshot(device_post_json(
            &format!("/habits/{id}/check"),
            json!({ "done": true }),
        ))
        .await
        .unwrap();
    let habit = json_body(response).await;
    assert_eq!(habit["streak"], json!(1));

    // Undoing the mark takes the streak back down.
    let response = app
        .oneshot(device_post_json(
            &format!("/habits/{id}/check"),
            json!({ "done": false }),
        ))
        .await
        .unwrap();
    let habit = json_body(response).await;
    assert_eq!(habit["streak"], json!(0));
}

#[tokio::test]
async fn today_lists_completion_state() {
    let app = make_app();

    let response = app
        .clone()
        .oneshot(device_post_json(
            "/habits",
            json!({
                "name": "Call Mom",
                "category": "Family",
                "frequency": "Daily"
            }),
        ))
        .await
        .unwrap();
    let habit = json_body(response).await;
    let id = habit["id"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(device_post_json(
            &format!("/habits/{id}/check"),
            json!({ "done": true }),
        ))
        .await
        .unwrap();

    let response = app.oneshot(device_get("/habits/today")).await.unwrap();
    let today = json_body(response).await;
    assert_eq!(today["total"], json!(1));
    assert_eq!(today["completed"], json!(1));
    assert_eq!(today["habits"][0]["completed"], json!(true));
}

#[tokio::test]
async fn progress_covers_a_seven_day_window() {
    let app = make_app();

    let response = app
        .clone()
        .oneshot(device_post_json(
            "/habits",
            json!({
                "name": "Give Weekly Charity",
                "category": "Charity",
                "frequency": "Weekly"
            }),
        ))
        .await
        .unwrap();
    let habit = json_body(response).await;
    let id = habit["id"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(device_post_json(
            &format!("/habits/{id}/check"),
            json!({ "done": true }),
        ))
        .await
        .unwrap();

    let response = app.oneshot(device_get("/progress")).await.unwrap();
    let progress = json_body(response).await;
    let days = progress["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    // The fixed clock says 2024-01-01, so the last window day holds the check.
    assert_eq!(days[6]["day"], json!("2024-01-01"));
    assert_eq!(days[6]["completed"], json!(1));

    let achievements = progress["achievements"].as_array().unwrap();
    assert_eq!(achievements.len(), 5);
    // A streak of one earns nothing yet.
    assert!(achievements.iter().all(|a| a["earned"] == json!(false)));
}

// =============================================================================
// Quotes and prayer times
// =============================================================================

#[tokio::test]
async fn the_daily_quote_follows_the_rotation() {
    let app = make_app();
    let response = app
        .oneshot(Request::get("/quotes/daily").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let expected = habit_tracker_core::quotes::daily(fixed_now().date());
    assert_eq!(body["reference"], json!(expected.reference));
}

#[tokio::test]
async fn prayer_times_report_current_and_next() {
    // 13:00 falls between Dhuhr and Asr.
    let state = make_state_at(
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap(),
    );
    let app = build_router(state);

    let response = app
        .oneshot(Request::get("/prayer-times").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["current"], json!("Dhuhr"));
    assert_eq!(body["next"], json!("Asr"));
    assert_eq!(body["prayers"].as_array().unwrap().len(), 5);
}

// =============================================================================
// Auth
// =============================================================================

fn extract_session_cookie(response: &axum::response::Response) -> String {
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn signup_creates_a_usable_session() {
    let app = make_app();

    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "email": "amina@example.com", "password": "strong-password" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = extract_session_cookie(&response);

    // The cookie authenticates data routes without a device id.
    let response = app
        .oneshot(
            Request::get("/reminders")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn signup_adopts_the_presenting_device() {
    let app = make_app();

    // The anonymous device accumulates its seeded reminders first.
    let response = app.clone().oneshot(device_get("/reminders")).await.unwrap();
    let seeded = json_body(response).await;
    let seeded_ids: Vec<&str> = seeded
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();

    // Signing up with the device header moves those rows to the account.
    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-device-id", DEVICE)
                .body(Body::from(
                    json!({ "email": "yusuf@example.com", "password": "strong-password" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = extract_session_cookie(&response);

    let response = app
        .oneshot(
            Request::get("/reminders")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let adopted = json_body(response).await;
    let adopted_ids: Vec<&str> = adopted
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    // The account sees the device's original rows, not a fresh seed.
    assert_eq!(adopted_ids, seeded_ids);
}

#[tokio::test]
async fn login_rejects_a_wrong_password() {
    let app = make_app();

    app.clone()
        .oneshot(
            Request::post("/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "email": "idris@example.com", "password": "correct-password" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "email": "idris@example.com", "password": "wrong-password" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// The reminder watch task
// =============================================================================

#[tokio::test]
async fn the_watch_task_fires_a_due_reminder_exactly_once() {
    // The fixed clock sits at 07:00 on a Monday, which matches the seeded
    // "Quran Study Time" daily reminder (audio enabled).
    let state = make_state();
    let owner = Owner::Device(DEVICE.to_string());

    let session = SessionState::new(&state, owner)
        .await
        .expect("session init");
    let token = session.cancellation_token.clone();
    let session_lock = Arc::new(tokio::sync::Mutex::new(session));

    let notifications = Arc::new(RecordingNotifications::default());
    let audio = Arc::new(RecordingAudio::default());

    let handle = tokio::spawn(reminder_watch_process(
        state.clone(),
        session_lock,
        notifications.clone(),
        audio.clone(),
        token.clone(),
    ));

    // Several 20 ms polls elapse; the clock never leaves the 07:00 minute.
    tokio::time::sleep(Duration::from_millis(150)).await;
    token.cancel();
    handle.await.unwrap().unwrap();

    let notes = notifications.0.lock().unwrap();
    let fired: Vec<_> = notes
        .iter()
        .filter(|n| n.title.contains("Quran Study Time"))
        .collect();
    assert_eq!(fired.len(), 1, "idempotent within the minute");

    // The seeded reminder plays audio, so exactly one cue went out too.
    let cues = audio.0.lock().unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].0, AudioCategory::QuranStudy);
    assert_eq!(cues[0].1, 8000);
}
