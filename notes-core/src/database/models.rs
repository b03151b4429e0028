//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to a UI layer.

use crate::config::{DEFAULT_COLOR, DEFAULT_TAG, NOTE_DATE_FORMAT};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A free-text note
///
/// Column names follow the `notes` table (`isCompleted`, `reminderTime`, ...),
/// and so does the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Note {
    /// Assigned by the store; ignored on insert
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Creation time, `yyyy-MM-dd HH:mm`
    pub date: String,
    pub tag: String,
    pub color: String,
    pub is_completed: bool,
    /// Unused; attachments are not stored
    pub image_path: String,
    /// Epoch milliseconds as text, or empty for no reminder
    pub reminder_time: String,
    /// Display form of `reminder_time`, empty iff `reminder_time` is empty
    pub reminder_date: String,
}

impl Default for Note {
    fn default() -> Self {
        Self {
            id: 0,
            title: String::new(),
            content: String::new(),
            date: String::new(),
            tag: DEFAULT_TAG.to_string(),
            color: DEFAULT_COLOR.to_string(),
            is_completed: false,
            image_path: String::new(),
            reminder_time: String::new(),
            reminder_date: String::new(),
        }
    }
}

impl Note {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tag: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tag: tag.into(),
            color: color.into(),
            ..Self::default()
        }
    }

    /// Set or clear the reminder, keeping `reminder_date` in step.
    ///
    /// Returns `false` (and leaves the note untouched) when the timestamp
    /// cannot be represented as a local date.
    pub fn set_reminder(&mut self, fire_at_millis: Option<i64>) -> bool {
        match fire_at_millis {
            Some(millis) => match format_reminder_date(millis) {
                Some(display) => {
                    self.reminder_time = millis.to_string();
                    self.reminder_date = display;
                    true
                }
                None => false,
            },
            None => {
                self.reminder_time.clear();
                self.reminder_date.clear();
                true
            }
        }
    }

    pub fn has_reminder(&self) -> bool {
        !self.reminder_time.trim().is_empty()
    }

    /// Parsed reminder timestamp, if one is set and well-formed
    pub fn reminder_millis(&self) -> Option<i64> {
        self.reminder_time.trim().parse().ok()
    }
}

/// Format a local time the way notes display dates
pub fn format_note_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format(NOTE_DATE_FORMAT).to_string()
}

/// Current local time as a note creation date
pub fn now_note_date() -> String {
    format_note_date(&Local::now())
}

/// Display form of an epoch-millisecond reminder in local time
pub fn format_reminder_date(millis: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|at| format_note_date(&at))
}

/// Whether a fired reminder should be audible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum NotifyMode {
    Sound,
    /// Silent, no vibration
    #[default]
    Default,
}

impl NotifyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyMode::Sound => "Sound",
            NotifyMode::Default => "Default",
        }
    }

    pub fn is_audible(&self) -> bool {
        matches!(self, NotifyMode::Sound)
    }
}

impl From<&str> for NotifyMode {
    /// Anything other than "Sound" is silent.
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("sound") {
            NotifyMode::Sound
        } else {
            NotifyMode::Default
        }
    }
}

impl From<String> for NotifyMode {
    fn from(value: String) -> Self {
        NotifyMode::from(value.as_str())
    }
}

impl fmt::Display for NotifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the timer request id for a fire time.
///
/// Stable for a given timestamp, so re-saving an unchanged reminder maps to
/// the same registration.
pub fn request_id_for(fire_at_millis: i64) -> i32 {
    (fire_at_millis % i64::from(i32::MAX)) as i32
}

/// An armed reminder, carrying a snapshot of what to show when it fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRegistration {
    pub request_id: i32,
    pub note_id: i64,
    /// Epoch milliseconds
    pub fire_at: i64,
    pub title: String,
    pub notify_mode: NotifyMode,
    pub created_at: DateTime<Utc>,
}

impl ReminderRegistration {
    pub fn new(note_id: i64, title: impl Into<String>, fire_at: i64, notify_mode: NotifyMode) -> Self {
        Self {
            request_id: request_id_for(fire_at),
            note_id,
            fire_at,
            title: title.into(),
            notify_mode,
            created_at: Utc::now(),
        }
    }
}

/// Row shape of the `reminders` table
#[derive(Debug, FromRow)]
pub(crate) struct ReminderRow {
    pub request_id: i64,
    pub note_id: i64,
    pub fire_at: i64,
    pub title: String,
    pub notify_mode: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReminderRow> for ReminderRegistration {
    fn from(row: ReminderRow) -> Self {
        Self {
            request_id: row.request_id as i32,
            note_id: row.note_id,
            fire_at: row.fire_at,
            title: row.title,
            notify_mode: NotifyMode::from(row.notify_mode),
            created_at: row.created_at,
        }
    }
}
