//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the live reminder session.

use habit_tracker_core::domain::{Reminder, Severity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Initializes a session. This must be the first message sent on the connection.
    /// Anonymous browsers identify themselves with their locally generated
    /// device id; signed-in browsers rely on the auth cookie instead.
    Init { device_id: Option<String> },

    /// Creates a new reminder for this session's owner.
    CreateReminder { reminder: ReminderInput },

    /// Replaces an existing reminder's fields with the edit form contents.
    UpdateReminder { id: Uuid, reminder: ReminderInput },

    /// Deletes a reminder.
    DeleteReminder { id: Uuid },

    /// Flips a reminder's active flag.
    ToggleActive { id: Uuid },

    /// Flips whether a reminder plays audio when it fires.
    ToggleAudio { id: Uuid },

    /// Asks the server for an audio cue so the user can preview a category.
    TestAudio { category: String },
}

/// The reminder fields as entered in the client's add/edit form.
#[derive(Deserialize, Debug, Clone)]
pub struct ReminderInput {
    pub title: String,
    pub message: String,
    /// `"HH:MM"`, 24-hour.
    pub time: String,
    /// A frequency label such as `"Daily"` or `"Weekly (Monday)"`.
    pub frequency: String,
    pub category: String,
    pub audio_category: String,
    #[serde(default = "default_play_audio")]
    pub play_audio: bool,
}

fn default_play_audio() -> bool {
    true
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms successful session initialization.
    SessionInitialized { reminder_count: usize },

    /// The owner's full reminder list, sent after init and after every mutation.
    ReminderList { reminders: Vec<ReminderView> },

    /// A reminder fired; the client should show a toast or browser notification.
    ReminderFired {
        title: String,
        message: String,
        severity: String,
    },

    /// The client should play the given recitation.
    PlayAudio {
        category: String,
        url: String,
        duration_ms: u64,
    },

    /// Reports an error to the client, which should display an error message.
    Error { message: String },
}

/// A reminder as shown to the client.
#[derive(Serialize, Debug, Clone)]
pub struct ReminderView {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    /// `None` when the stored time was malformed; the client renders it as unset.
    pub time: Option<String>,
    pub frequency: String,
    pub category: String,
    pub audio_category: String,
    pub play_audio: bool,
    pub active: bool,
}

impl ReminderView {
    pub fn from_domain(reminder: &Reminder) -> Self {
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

/// The wire label for a notification severity.
pub fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Success => "success",
        Severity::Warning => "warning",
    }
}
