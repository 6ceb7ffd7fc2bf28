//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! It resolves the session's owner, keeps the reminder snapshot in sync with
//! client mutations, and delegates firing to the watch task.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::Response,
};
use chrono::Utc;
use futures::StreamExt;
use habit_tracker_core::domain::{
    AudioCategory, Notification, Owner, RecurrenceRule, Reminder, ReminderPatch, Severity,
    TimeOfDay,
};
use habit_tracker_core::ports::{AudioSink, NotificationSink, PortResult};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::web::{
    middleware::session_cookie,
    protocol::{ClientMessage, ReminderInput, ReminderView, ServerMessage},
    sinks::{send_server_message, SharedSocketSender, WsAudioSink, WsNotificationSink},
    state::{AppState, SessionState},
    watch_task::reminder_watch_process,
};

/// How long an audio preview requested with `test_audio` plays.
const TEST_AUDIO_MS: u64 = 5000;

/// The handler for upgrading HTTP requests to WebSocket connections.
///
/// The auth cookie is optional here: anonymous browsers identify themselves
/// with a device id in the `init` message instead.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let user_id = match session_cookie(&headers) {
        Some(session_id) => app_state
            .store
            .validate_auth_session(&session_id)
            .await
            .ok(),
        None => None,
    };
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, user_id))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, user_id: Option<Uuid>) {
    // The sender is wrapped in an Arc<Mutex<>> to allow for shared mutable access across tasks.
    let (sender, mut receiver) = socket.split();
    let ws_sender: SharedSocketSender = Arc::new(Mutex::new(sender));

    // --- 1. Initialization Phase ---
    let owner = if let Some(Ok(Message::Text(init_json))) = receiver.next().await {
        match serde_json::from_str::<ClientMessage>(&init_json) {
            Ok(ClientMessage::Init { device_id }) => match (user_id, device_id) {
                (Some(user_id), _) => Owner::User(user_id),
                (None, Some(device_id)) if !device_id.trim().is_empty() => {
                    Owner::Device(device_id)
                }
                _ => {
                    let err_msg = ServerMessage::Error {
                        message: "Session requires a signed-in user or a device id.".to_string(),
                    };
                    let _ = send_server_message(&ws_sender, &err_msg).await;
                    return;
                }
            },
            _ => {
                let err_msg = ServerMessage::Error {
                    message: "The first message must be 'init'.".to_string(),
                };
                let _ = send_server_message(&ws_sender, &err_msg).await;
                return;
            }
        }
    } else {
        return;
    };
    info!("New reminder session for owner: {:?}", owner);

    let session_state = match SessionState::new(&app_state, owner).await {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to initialize reminder session: {:?}", err);
            let err_msg = ServerMessage::Error {
                message: "Failed to load reminders. Please retry.".to_string(),
            };
            let _ = send_server_message(&ws_sender, &err_msg).await;
            return;
        }
    };
    let cancellation_token = session_state.cancellation_token.clone();
    let session_state_lock = Arc::new(Mutex::new(session_state));

    {
        let session = session_state_lock.lock().await;
        let _ = send_server_message(
            &ws_sender,
            &ServerMessage::SessionInitialized {
                reminder_count: session.reminders.len(),
            },
        )
        .await;
        let _ = send_server_message(&ws_sender, &reminder_list(&session.reminders)).await;
    }

    // --- 2. Spawn the Reminder Watch Task ---
    let notifications: Arc<dyn NotificationSink> =
        Arc::new(WsNotificationSink::new(ws_sender.clone()));
    let audio: Arc<dyn AudioSink> = Arc::new(WsAudioSink::new(
        ws_sender.clone(),
        app_state.recitations.clone(),
    ));
    let watch_handle = tokio::spawn(reminder_watch_process(
        app_state.clone(),
        session_state_lock.clone(),
        notifications.clone(),
        audio.clone(),
        cancellation_token.clone(),
    ));

    // --- 3. Client Message Loop ---
    while let Some(Ok(message)) = receiver.next().await {
        let Message::Text(json) = message else {
            continue;
        };
        match serde_json::from_str::<ClientMessage>(&json) {
            Ok(client_message) => {
                if let Err(err) = handle_client_message(
                    &app_state,
                    &session_state_lock,
                    &ws_sender,
                    notifications.as_ref(),
                    audio.as_ref(),
                    client_message,
                )
                .await
                {
                    warn!("Client message failed: {err}");
                    let err_msg = ServerMessage::Error {
                        message: err.to_string(),
                    };
                    let _ = send_server_message(&ws_sender, &err_msg).await;
                }
            }
            Err(err) => {
                let err_msg = ServerMessage::Error {
                    message: format!("Invalid message: {err}"),
                };
                let _ = send_server_message(&ws_sender, &err_msg).await;
            }
        }
    }

    // --- 4. Teardown ---
    info!("WebSocket closed; stopping reminder watch.");
    cancellation_token.cancel();
    let _ = watch_handle.await;
}

fn reminder_list(reminders: &[Reminder]) -> ServerMessage {
    ServerMessage::ReminderList {
        reminders: reminders.iter().map(ReminderView::from_domain).collect(),
    }
}

/// Builds a domain reminder from the client's add form.
fn reminder_from_input(owner: Owner, input: &ReminderInput) -> Reminder {
    let now = Utc::now();
    Reminder {
        id: Uuid::new_v4(),
        owner,
        title: input.title.clone(),
        message: input.message.clone(),
        time_of_day: TimeOfDay::parse(&input.time),
        rule: RecurrenceRule::parse(&input.frequency),
        category: input.category.clone(),
        audio_category: AudioCategory::parse(&input.audio_category),
        play_audio: input.play_audio,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Builds a full-row patch from the client's edit form.
fn patch_from_input(input: &ReminderInput) -> ReminderPatch {
    ReminderPatch {
        title: Some(input.title.clone()),
        message: Some(input.message.clone()),
        time_of_day: Some(TimeOfDay::parse(&input.time)),
        rule: Some(RecurrenceRule::parse(&input.frequency)),
        category: Some(input.category.clone()),
        audio_category: Some(AudioCategory::parse(&input.audio_category)),
        play_audio: Some(input.play_audio),
        active: None,
    }
}

async fn handle_client_message(
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    ws_sender: &SharedSocketSender,
    notifications: &dyn NotificationSink,
    audio: &dyn AudioSink,
    message: ClientMessage,
) -> PortResult<()> {
    match message {
        ClientMessage::Init { .. } => {
            // Already initialised; a repeated init is harmless noise.
            Ok(())
        }

        ClientMessage::CreateReminder { reminder } => {
            let mut session = session_state_lock.lock().await;
            let created = app_state
                .store
                .create_reminder(reminder_from_input(session.owner.clone(), &reminder))
                .await?;
            session.reminders.push(created);
            // Any change to the reminder set wipes the firing memory.
            session.scheduler.invalidate();
            session.revision = app_state.bump_revision(&session.owner).await;
            send_server_message(ws_sender, &reminder_list(&session.reminders)).await
        }

        ClientMessage::UpdateReminder { id, reminder } => {
            let mut session = session_state_lock.lock().await;
            let patch = patch_from_input(&reminder);
            let invalidate = patch.affects_schedule();
            let updated = app_state
                .store
                .update_reminder(id, &session.owner, patch)
                .await?;
            if let Some(slot) = session.reminders.iter_mut().find(|r| r.id == id) {
                *slot = updated;
            }
            if invalidate {
                session.scheduler.invalidate();
            }
            session.revision = app_state.bump_revision(&session.owner).await;
            send_server_message(ws_sender, &reminder_list(&session.reminders)).await
        }

        ClientMessage::DeleteReminder { id } => {
            let mut session = session_state_lock.lock().await;
            app_state.store.delete_reminder(id, &session.owner).await?;
            session.reminders.retain(|r| r.id != id);
            session.scheduler.invalidate();
            session.revision = app_state.bump_revision(&session.owner).await;
            send_server_message(ws_sender, &reminder_list(&session.reminders)).await
        }

        ClientMessage::ToggleActive { id } => {
            let mut session = session_state_lock.lock().await;
            let currently_active = session
                .reminders
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.active)
                .unwrap_or(false);
            let patch = ReminderPatch {
                active: Some(!currently_active),
                ..Default::default()
            };
            let updated = app_state
                .store
                .update_reminder(id, &session.owner, patch)
                .await?;
            if let Some(slot) = session.reminders.iter_mut().find(|r| r.id == id) {
                *slot = updated;
            }
            session.scheduler.invalidate();
            session.revision = app_state.bump_revision(&session.owner).await;
            send_server_message(ws_sender, &reminder_list(&session.reminders)).await
        }

        ClientMessage::ToggleAudio { id } => {
            let mut session = session_state_lock.lock().await;
            let currently_playing = session
                .reminders
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.play_audio)
                .unwrap_or(false);
            let patch = ReminderPatch {
                play_audio: Some(!currently_playing),
                ..Default::default()
            };
            let updated = app_state
                .store
                .update_reminder(id, &session.owner, patch)
                .await?;
            if let Some(slot) = session.reminders.iter_mut().find(|r| r.id == id) {
                *slot = updated;
            }
            // Audio preference does not touch the schedule, so the firing
            // memory stays intact.
            session.revision = app_state.bump_revision(&session.owner).await;
            send_server_message(ws_sender, &reminder_list(&session.reminders)).await
        }

        ClientMessage::TestAudio { category } => {
            let category = AudioCategory::parse(&category);
            audio.play(category, TEST_AUDIO_MS).await?;
            let note = Notification {
                title: "Testing Audio 🔊".to_string(),
                message: format!("Playing {} reminder tone...", category.label()),
                severity: Severity::Info,
            };
            notifications.notify(&note).await
        }
    }
}
