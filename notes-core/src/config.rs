//! Application configuration
//!
//! Central location for defaults, display formats, notification channel
//! identifiers and the on-disk layout used throughout the crate.

use std::path::{Path, PathBuf};

// ===== Note Defaults =====

/// Tag assigned to a note saved without one
pub const DEFAULT_TAG: &str = "Personal";

/// Color label assigned to a note saved without one
pub const DEFAULT_COLOR: &str = "Red";

/// Tag filter value that matches every note
pub const ALL_TAGS_FILTER: &str = "All";

/// chrono format for `Note::date` and `Note::reminder_date` (`yyyy-MM-dd HH:mm`)
pub const NOTE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

// ===== Reminder Notifications =====

/// Notification channel every reminder is posted to
pub const REMINDER_CHANNEL_ID: &str = "reminder_channel";

/// Human-readable channel name
pub const REMINDER_CHANNEL_NAME: &str = "Reminders";

pub const REMINDER_CHANNEL_DESCRIPTION: &str = "Reminder notifications";

/// Fixed heading of a reminder notification; the body is the note title
pub const REMINDER_HEADING: &str = "Reminder";

// ===== Storage =====

/// Current schema version. A database carrying any other version is
/// dropped and recreated on startup.
pub const SCHEMA_VERSION: i64 = 2;

pub const DATABASE_FILE_NAME: &str = "notes.db";

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "notes_core=debug,info";

/// Runtime configuration for [`crate::app::AppState`]
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the database and the settings file
    pub data_dir: PathBuf,
    pub database_file: String,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            database_file: DATABASE_FILE_NAME.to_string(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
