//! services/api/src/web/sinks.rs
//!
//! WebSocket-backed implementations of the side-effect sink ports. The
//! browser renders the toast and plays the recitation; the server's job ends
//! once the message is on the socket.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::{stream::SplitSink, SinkExt};
use habit_tracker_core::domain::{AudioCategory, Notification};
use habit_tracker_core::ports::{AudioSink, NotificationSink, PortError, PortResult};
use tokio::sync::Mutex;

use crate::adapters::RecitationLibrary;
use crate::web::protocol::{severity_label, ServerMessage};

/// The write half of a WebSocket, shared between the receive loop and the
/// reminder watch task.
pub type SharedSocketSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Serializes a server message and sends it down the socket.
pub async fn send_server_message(
    sender: &SharedSocketSender,
    message: &ServerMessage,
) -> PortResult<()> {
    let json = serde_json::to_string(message)
        .map_err(|e| PortError::Unexpected(format!("Failed to encode server message: {e}")))?;
    sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| PortError::Unexpected(format!("Failed to send server message: {e}")))
}

/// Delivers reminder notifications as `reminder_fired` messages.
pub struct WsNotificationSink {
    sender: SharedSocketSender,
}

impl WsNotificationSink {
    pub fn new(sender: SharedSocketSender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl NotificationSink for WsNotificationSink {
    async fn notify(&self, notification: &Notification) -> PortResult<()> {
        let message = ServerMessage::ReminderFired {
            title: notification.title.clone(),
            message: notification.message.clone(),
            severity: severity_label(notification.severity).to_string(),
        };
        send_server_message(&self.sender, &message).await
    }
}

/// Delivers audio cues as `play_audio` messages with a resolved recitation URL.
pub struct WsAudioSink {
    sender: SharedSocketSender,
    library: Arc<RecitationLibrary>,
}

impl WsAudioSink {
    pub fn new(sender: SharedSocketSender, library: Arc<RecitationLibrary>) -> Self {
        Self { sender, library }
    }
}

#[async_trait]
impl AudioSink for WsAudioSink {
    async fn play(&self, category: AudioCategory, duration_ms: u64) -> PortResult<()> {
        let message = ServerMessage::PlayAudio {
            category: category.label().to_string(),
            url: self.library.url_for(category),
            duration_ms,
        };
        send_server_message(&self.sender, &message).await
    }
}
