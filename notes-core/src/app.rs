//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState,
//! which is the programmatic surface a UI layer drives.

use crate::config::{AppConfig, DEFAULT_LOG_FILTER};
use crate::database::{create_pool, Note, NotifyMode, ReminderRegistration, Repository};
use crate::error::{AppError, Result};
use crate::services::{
    CronWakeTimer, NoteFilter, NotesService, NotificationDispatcher, NotificationSurface,
    ReminderTrigger, RemindersService, SettingsService,
};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling it more than once is harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// What happened to the reminder when a note was saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReminderOutcome {
    /// The note has no reminder and none was armed before
    None,
    Scheduled { registration: ReminderRegistration },
    Cancelled,
    /// The reminder time was not edited and has already passed, so it is
    /// not armed again
    Unchanged,
    /// The note was saved but its reminder was not set
    Failed { message: String },
}

/// Result of saving a note together with its reminder
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub note: Note,
    pub reminder: ReminderOutcome,
}

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub notes_service: NotesService,
    pub reminders_service: RemindersService,
    pub settings_service: SettingsService,
    timer: Arc<CronWakeTimer>,
}

impl AppState {
    /// Open the database, start the reminder timer and re-arm reminders
    /// persisted by a previous run.
    ///
    /// A timer that cannot start leaves notes fully usable; reminders then
    /// fail with `SchedulingUnavailable`.
    pub async fn initialize(
        config: AppConfig,
        surface: Arc<dyn NotificationSurface>,
    ) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("Data directory: {:?}", config.data_dir());

        std::fs::create_dir_all(config.data_dir())?;

        let pool = create_pool(&config.database_path()).await?;
        let repo = Repository::new(pool);

        let dispatcher = NotificationDispatcher::new(surface);
        let trigger = Arc::new(ReminderTrigger::new(repo.clone(), dispatcher));
        let timer = Arc::new(CronWakeTimer::new(trigger).await?);

        if let Err(e) = timer.start().await {
            tracing::error!("Reminder timer unavailable: {}", e);
        }

        let reminders_service = RemindersService::new(repo.clone(), timer.clone());
        if timer.is_running() {
            if let Err(e) = reminders_service.rearm_pending().await {
                tracing::error!("Failed to re-arm pending reminders: {}", e);
            }
        }

        let state = Self {
            settings_service: SettingsService::new(config.data_dir.clone()),
            notes_service: NotesService::new(repo),
            reminders_service,
            timer,
            config,
        };

        tracing::info!("Application initialized successfully");

        Ok(state)
    }

    /// Save a new note, then arm its reminder if it has one.
    ///
    /// `notify_mode` falls back to the configured default.
    pub async fn add_note(&self, note: Note, notify_mode: Option<NotifyMode>) -> Result<SaveOutcome> {
        let id = self.notes_service.create_note(note).await?;
        let note = self.notes_service.get_note(id).await?;

        let reminder = if note.has_reminder() {
            self.schedule_for(&note, notify_mode).await
        } else {
            ReminderOutcome::None
        };

        Ok(SaveOutcome { note, reminder })
    }

    /// Save an edited note, then re-arm or cancel its reminder to match.
    ///
    /// Re-saving an unchanged reminder time that is still ahead supersedes
    /// the existing registration rather than adding a second one. An
    /// unchanged time in the past is left alone so it never fires twice.
    pub async fn edit_note(&self, note: Note, notify_mode: Option<NotifyMode>) -> Result<SaveOutcome> {
        let previous = self.notes_service.get_note(note.id).await?;
        let note = self.notes_service.update_note(note).await?;

        let reminder = if !note.has_reminder() {
            self.cancel_for(note.id).await
        } else if note.reminder_time == previous.reminder_time && !is_ahead(&note) {
            tracing::debug!("Reminder of note {} already passed, not re-armed", note.id);
            ReminderOutcome::Unchanged
        } else {
            self.schedule_for(&note, notify_mode).await
        };

        Ok(SaveOutcome { note, reminder })
    }

    /// Delete a note and, best effort, its reminder
    pub async fn delete_note(&self, id: i64) -> Result<()> {
        self.notes_service.delete_note(id).await?;

        if let Err(e) = self.reminders_service.cancel(id).await {
            tracing::warn!("Failed to cancel reminder of deleted note {}: {}", id, e);
        }

        Ok(())
    }

    pub async fn set_completed(&self, id: i64, is_completed: bool) -> Result<()> {
        self.notes_service.update_note_status(id, is_completed).await
    }

    /// Notes to render for the current filter state
    pub async fn visible_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        self.notes_service.list_filtered(filter).await
    }

    pub fn wake_timer(&self) -> &CronWakeTimer {
        &self.timer
    }

    /// Stop the reminder timer. Persisted reminders are re-armed by the
    /// next `initialize`.
    pub async fn shutdown(&self) -> Result<()> {
        self.timer.shutdown().await
    }

    async fn schedule_for(&self, note: &Note, notify_mode: Option<NotifyMode>) -> ReminderOutcome {
        let Some(fire_at) = note.reminder_millis() else {
            return ReminderOutcome::Failed {
                message: format!("Invalid reminder time: {}", note.reminder_time),
            };
        };

        let mode = match notify_mode {
            Some(mode) => mode,
            None => self.fallback_mode(note.id).await,
        };

        match self
            .reminders_service
            .schedule(note.id, &note.title, fire_at, mode)
            .await
        {
            Ok(registration) => ReminderOutcome::Scheduled { registration },
            Err(e) => {
                tracing::warn!("Note {} saved without its reminder: {}", note.id, e);
                ReminderOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Mode of the note's pending reminder, else the configured default
    async fn fallback_mode(&self, note_id: i64) -> NotifyMode {
        match self.reminders_service.list_pending().await {
            Ok(pending) => {
                if let Some(current) = pending.iter().find(|r| r.note_id == note_id) {
                    return current.notify_mode;
                }
            }
            Err(e) => tracing::warn!("Could not read pending reminders: {}", e),
        }

        match self.settings_service.get_reminders().await {
            Ok(settings) => settings.default_notify_mode,
            Err(e) => {
                tracing::warn!("Falling back to silent reminders: {}", e);
                NotifyMode::Default
            }
        }
    }

    async fn cancel_for(&self, note_id: i64) -> ReminderOutcome {
        match self.reminders_service.list_pending().await {
            Ok(pending) if !pending.iter().any(|r| r.note_id == note_id) => {
                return ReminderOutcome::None;
            }
            Ok(_) => {}
            Err(e) => return failed(e),
        }

        match self.reminders_service.cancel(note_id).await {
            Ok(()) => ReminderOutcome::Cancelled,
            Err(e) => failed(e),
        }
    }
}

fn is_ahead(note: &Note) -> bool {
    note.reminder_millis()
        .is_some_and(|at| at > chrono::Utc::now().timestamp_millis())
}

fn failed(e: AppError) -> ReminderOutcome {
    tracing::warn!("Reminder update failed: {}", e);
    ReminderOutcome::Failed {
        message: e.to_string(),
    }
}
