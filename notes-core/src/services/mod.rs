//! Services module
//!
//! Business logic services that coordinate between callers and the repository.

pub mod filter;
pub mod notes;
pub mod notifications;
pub mod reminders;
pub mod settings;
pub mod timer;

pub use filter::{apply_filters, NoteFilter};
pub use notes::NotesService;
pub use notifications::{
    LogNotificationSurface, Notification, NotificationChannel, NotificationDispatcher,
    NotificationSurface,
};
pub use reminders::{ReminderTrigger, RemindersService};
pub use settings::SettingsService;
pub use timer::{CronWakeTimer, TriggerHandler, WakeTimer};
