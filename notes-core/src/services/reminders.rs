//! Reminders service
//!
//! Maps a note's reminder time to a wake timer registration. Registrations
//! are persisted so they can be re-armed after a restart, and each note holds
//! at most one. Scheduling is independent of saving the note: a failure here
//! never touches the note itself.

use crate::database::{NotifyMode, ReminderRegistration, Repository};
use crate::error::Result;
use crate::services::notifications::NotificationDispatcher;
use crate::services::timer::{TriggerHandler, WakeTimer};
use async_trait::async_trait;
use std::sync::Arc;

/// Service for scheduling and cancelling note reminders
#[derive(Clone)]
pub struct RemindersService {
    repo: Repository,
    timer: Arc<dyn WakeTimer>,
}

impl RemindersService {
    pub fn new(repo: Repository, timer: Arc<dyn WakeTimer>) -> Self {
        Self { repo, timer }
    }

    /// Arm a reminder for a note.
    ///
    /// Scheduling the same note and time again supersedes the earlier
    /// registration. A different time replaces the note's previous reminder.
    pub async fn schedule(
        &self,
        note_id: i64,
        title: &str,
        fire_at_millis: i64,
        notify_mode: NotifyMode,
    ) -> Result<ReminderRegistration> {
        tracing::info!(
            "Scheduling reminder for note {} at {} ({})",
            note_id,
            fire_at_millis,
            notify_mode
        );

        let registration = ReminderRegistration::new(note_id, title, fire_at_millis, notify_mode);

        // The row must exist before the timer can fire and clear it
        self.repo.upsert_reminder(&registration).await?;

        if let Err(e) = self.timer.arm(registration.clone()).await {
            if let Err(delete_err) = self.repo.delete_reminder(registration.request_id).await {
                tracing::warn!("Failed to drop unarmed reminder: {}", delete_err);
            }
            return Err(e);
        }

        for previous in self.repo.list_reminders_for_note(note_id).await? {
            if previous.request_id != registration.request_id {
                self.remove_registration(previous.request_id).await?;
            }
        }

        tracing::info!(
            "Reminder {} scheduled for note {}",
            registration.request_id,
            note_id
        );
        Ok(registration)
    }

    /// Cancel every reminder of a note. A note without one is fine.
    pub async fn cancel(&self, note_id: i64) -> Result<()> {
        let registrations = self.repo.list_reminders_for_note(note_id).await?;

        if registrations.is_empty() {
            tracing::debug!("No reminder to cancel for note {}", note_id);
            return Ok(());
        }

        for registration in registrations {
            self.remove_registration(registration.request_id).await?;
        }

        tracing::info!("Reminder cancelled for note {}", note_id);
        Ok(())
    }

    /// Persisted registrations that have not fired yet, soonest first
    pub async fn list_pending(&self) -> Result<Vec<ReminderRegistration>> {
        self.repo.list_reminders().await
    }

    /// Re-arm every persisted registration, e.g. after a restart.
    ///
    /// Registrations whose time has passed fire right away.
    pub async fn rearm_pending(&self) -> Result<usize> {
        let pending = self.list_pending().await?;
        let count = pending.len();

        for registration in pending {
            self.timer.arm(registration).await?;
        }

        tracing::info!("Re-armed {} pending reminders", count);
        Ok(count)
    }

    async fn remove_registration(&self, request_id: i32) -> Result<()> {
        if let Err(e) = self.timer.disarm(request_id).await {
            tracing::warn!("Failed to disarm reminder {}: {}", request_id, e);
        }
        self.repo.delete_reminder(request_id).await
    }
}

/// Runs when a reminder fires: notifies from the snapshot, then forgets the
/// registration. The note may have been edited or deleted meanwhile.
pub struct ReminderTrigger {
    repo: Repository,
    dispatcher: NotificationDispatcher,
}

impl ReminderTrigger {
    pub fn new(repo: Repository, dispatcher: NotificationDispatcher) -> Self {
        Self { repo, dispatcher }
    }
}

#[async_trait]
impl TriggerHandler for ReminderTrigger {
    async fn on_trigger(&self, registration: ReminderRegistration) {
        if let Err(e) = self
            .dispatcher
            .dispatch(&registration.title, registration.notify_mode)
            .await
        {
            tracing::error!(
                "Failed to send notification for reminder {}: {}",
                registration.request_id,
                e
            );
        }

        match self.repo.delete_fired_reminder(&registration).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(
                "Reminder {} was replaced before it fired",
                registration.request_id
            ),
            Err(e) => tracing::error!(
                "Failed to clear fired reminder {}: {}",
                registration.request_id,
                e
            ),
        }
    }
}
