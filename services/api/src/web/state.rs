//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use habit_tracker_core::domain::{Owner, Reminder};
use habit_tracker_core::ports::{Clock, HabitStore, PortResult};
use habit_tracker_core::scheduler::ReminderScheduler;
use habit_tracker_core::seed;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::adapters::RecitationLibrary;
use crate::config::Config;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub store: Arc<dyn HabitStore>,
    pub config: Arc<Config>,
    pub recitations: Arc<RecitationLibrary>,
    pub clock: Arc<dyn Clock>,
    /// Per-owner mutation counters. Every reminder mutation bumps the
    /// owner's counter; a live reminder session that sees the counter move
    /// reloads its snapshot and clears its firing memory.
    revisions: RwLock<HashMap<Owner, u64>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn HabitStore>,
        config: Arc<Config>,
        recitations: Arc<RecitationLibrary>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            config,
            recitations,
            clock,
            revisions: RwLock::new(HashMap::new()),
        }
    }

    /// The owner's current mutation counter.
    pub async fn revision(&self, owner: &Owner) -> u64 {
        *self.revisions.read().await.get(owner).unwrap_or(&0)
    }

    /// Records a reminder mutation for the owner and returns the new counter.
    pub async fn bump_revision(&self, owner: &Owner) -> u64 {
        let mut revisions = self.revisions.write().await;
        let counter = revisions.entry(owner.clone()).or_insert(0);
        *counter += 1;
        *counter
    }
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// The state for a single, active WebSocket connection.
pub struct SessionState {
    pub owner: Owner,
    /// The current reminder snapshot the scheduler evaluates each tick.
    pub reminders: Vec<Reminder>,
    /// Owns the fired-set; this session's mutations invalidate it directly.
    pub scheduler: ReminderScheduler,
    /// The owner revision this snapshot was loaded at.
    pub revision: u64,
    /// A token to gracefully stop the reminder watch task.
    pub cancellation_token: CancellationToken,
}

//=========================================================================================
// SessionState Implementation (Constructor)
//=========================================================================================

impl SessionState {
    /// Creates a new `SessionState` by loading the owner's reminders.
    ///
    /// An owner with no stored reminders gets the default set, matching the
    /// first-run behavior of the browser app.
    pub async fn new(app_state: &AppState, owner: Owner) -> PortResult<Self> {
        let mut reminders = app_state.store.reminders_for_owner(&owner).await?;
        if reminders.is_empty() {
            for seeded in seed::default_reminders(&owner, Utc::now()) {
                reminders.push(app_state.store.create_reminder(seeded).await?);
            }
        }

        let revision = app_state.revision(&owner).await;
        Ok(Self {
            owner,
            reminders,
            scheduler: ReminderScheduler::new(),
            revision,
            cancellation_token: CancellationToken::new(),
        })
    }
}
