//! Reminder notifications
//!
//! Renders fired reminders and hands them to a [`NotificationSurface`], the
//! host's notification system. The channel is registered lazily before the
//! first notification is shown.

use crate::config::{
    REMINDER_CHANNEL_DESCRIPTION, REMINDER_CHANNEL_ID, REMINDER_CHANNEL_NAME, REMINDER_HEADING,
};
use crate::database::NotifyMode;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Importance {
    Default,
    High,
}

/// A category notifications are posted under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
    pub show_badge: bool,
    pub enable_lights: bool,
    pub enable_vibration: bool,
}

impl NotificationChannel {
    pub fn reminders() -> Self {
        Self {
            id: REMINDER_CHANNEL_ID.to_string(),
            name: REMINDER_CHANNEL_NAME.to_string(),
            description: REMINDER_CHANNEL_DESCRIPTION.to_string(),
            importance: Importance::High,
            show_badge: true,
            enable_lights: true,
            enable_vibration: false,
        }
    }
}

/// A rendered notification, ready for the surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub channel_id: String,
    pub id: i32,
    pub title: String,
    pub body: String,
    pub sound_enabled: bool,
    pub vibrate: bool,
    pub priority: Importance,
    pub auto_cancel: bool,
}

/// The host notification system
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Register a channel. Must tolerate being called for an existing channel.
    async fn create_channel(&self, channel: &NotificationChannel) -> Result<()>;

    async fn show(&self, notification: &Notification) -> Result<()>;
}

/// Surface that writes notifications to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSurface;

#[async_trait]
impl NotificationSurface for LogNotificationSurface {
    async fn create_channel(&self, channel: &NotificationChannel) -> Result<()> {
        tracing::info!("Notification channel ready: {} ({})", channel.id, channel.name);
        Ok(())
    }

    async fn show(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            channel = %notification.channel_id,
            id = notification.id,
            sound = notification.sound_enabled,
            "Notification: {} - {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}

/// Dispatches reminder notifications
#[derive(Clone)]
pub struct NotificationDispatcher {
    surface: Arc<dyn NotificationSurface>,
    channel: Arc<OnceCell<()>>,
    last_id: Arc<AtomicI32>,
}

impl NotificationDispatcher {
    pub fn new(surface: Arc<dyn NotificationSurface>) -> Self {
        Self {
            surface,
            channel: Arc::new(OnceCell::new()),
            last_id: Arc::new(AtomicI32::new(i32::MIN)),
        }
    }

    /// Show a reminder for `title`, audible only in [`NotifyMode::Sound`].
    pub async fn dispatch(&self, title: &str, mode: NotifyMode) -> Result<Notification> {
        self.ensure_channel().await?;

        let sound_enabled = mode.is_audible();
        let notification = Notification {
            channel_id: REMINDER_CHANNEL_ID.to_string(),
            id: self.next_notification_id(),
            title: REMINDER_HEADING.to_string(),
            body: title.to_string(),
            sound_enabled,
            vibrate: false,
            priority: Importance::High,
            auto_cancel: true,
        };

        self.surface.show(&notification).await?;

        tracing::info!(
            "Notification {} sent ({})",
            notification.id,
            if sound_enabled { "sound" } else { "silent" }
        );

        Ok(notification)
    }

    /// Create the reminder channel once; a failed attempt is retried on
    /// the next dispatch.
    async fn ensure_channel(&self) -> Result<()> {
        self.channel
            .get_or_try_init(|| async {
                self.surface
                    .create_channel(&NotificationChannel::reminders())
                    .await
            })
            .await?;
        Ok(())
    }

    /// Milliseconds since the epoch truncated to `i32`, bumped when two
    /// dispatches land in the same millisecond.
    fn next_notification_id(&self) -> i32 {
        let now = Utc::now().timestamp_millis() as i32;
        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(if now > last { now } else { last.wrapping_add(1) })
            })
            .unwrap_or(now);

        if now > previous {
            now
        } else {
            previous.wrapping_add(1)
        }
    }
}
