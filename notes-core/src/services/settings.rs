//! Settings service
//!
//! Manages application settings persistence using JSON file storage.

use crate::config::SETTINGS_FILE_NAME;
use crate::database::NotifyMode;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Reminder defaults applied when the caller does not choose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReminderSettings {
    /// Notify mode for reminders saved without an explicit one
    #[serde(default)]
    pub default_notify_mode: NotifyMode,
}

/// Display preferences. Stored here for the UI; nothing in this crate
/// renders differently because of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppearanceSettings {
    #[serde(default)]
    pub dark_mode: bool,
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub reminders: ReminderSettings,
    #[serde(default)]
    pub appearance: AppearanceSettings,
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            settings_path: data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !fs::try_exists(&self.settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)?;

        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    pub async fn get_reminders(&self) -> Result<ReminderSettings> {
        let settings = self.load().await?;
        Ok(settings.reminders)
    }

    pub async fn update_reminders(&self, reminders: ReminderSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.reminders = reminders;
        self.save(&settings).await
    }

    pub async fn get_appearance(&self) -> Result<AppearanceSettings> {
        let settings = self.load().await?;
        Ok(settings.appearance)
    }

    pub async fn update_appearance(&self, appearance: AppearanceSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.appearance = appearance;
        self.save(&settings).await
    }
}
