//! services/api/src/web/watch_task.rs
//!
//! This module contains the asynchronous "worker" task that watches the
//! clock for a connected session and dispatches reminder firings.

use std::sync::Arc;

use habit_tracker_core::domain::{Notification, Severity};
use habit_tracker_core::ports::{AudioSink, NotificationSink, PortResult};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::web::state::{AppState, SessionState};

/// The long-running reminder watch loop for one connection.
///
/// Polls the scheduler at the configured interval (30 seconds by default,
/// checking immediately on start), dispatches each firing to the sinks at
/// most once per occurrence, and stops when the token is cancelled. Sink
/// failures are logged and never retried within the tick; the next scheduled
/// occurrence retries naturally.
pub async fn reminder_watch_process(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    notifications: Arc<dyn NotificationSink>,
    audio: Arc<dyn AudioSink>,
    cancellation_token: CancellationToken,
) -> PortResult<()> {
    info!("Reminder watch started.");
    let mut interval = tokio::time::interval(app_state.config.reminder_poll);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Reminder watch cancelled.");
                return Ok(());
            }
            _ = interval.tick() => {}
        }

        let firings = {
            let mut session = session_state_lock.lock().await;

            // Pick up mutations made outside this connection (REST calls,
            // another tab). A changed revision means the schedule may have
            // moved, so the firing memory is cleared wholesale.
            let current = app_state.revision(&session.owner).await;
            if current != session.revision {
                match app_state.store.reminders_for_owner(&session.owner).await {
                    Ok(reminders) => {
                        session.reminders = reminders;
                        session.scheduler.invalidate();
                        session.revision = current;
                    }
                    Err(err) => {
                        // Keep ticking on the last known snapshot.
                        warn!("Failed to refresh reminder snapshot: {err}");
                    }
                }
            }

            let now = app_state.clock.now();
            let session = &mut *session;
            session.scheduler.tick(now, &session.reminders)
        };

        for firing in firings {
            info!("Firing reminder: {}", firing.title);

            if let Some(category) = firing.audio {
                if let Err(err) = audio.play(category, app_state.config.audio_duration_ms).await {
                    warn!("Audio cue failed: {err}");
                }
            }

            let notification = Notification {
                title: format!("🕌 {}", firing.title),
                message: firing.message,
                severity: Severity::Info,
            };
            if let Err(err) = notifications.notify(&notification).await {
                warn!("Notification delivery failed: {err}");
            }
        }
    }
}
