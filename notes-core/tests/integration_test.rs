//! Integration tests for notes-core
//!
//! These tests verify end-to-end functionality including:
//! - Note CRUD against an on-disk database
//! - Filtering of the stored note list
//! - Reminder scheduling, firing and re-arming across restarts

use async_trait::async_trait;
use notes_core::app::{AppState, ReminderOutcome};
use notes_core::config::AppConfig;
use notes_core::database::{create_pool, Note, NotifyMode, Repository};
use notes_core::error::{AppError, Result};
use notes_core::services::{
    apply_filters, NoteFilter, NotesService, Notification, NotificationChannel,
    NotificationSurface,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;

/// Helper to create a test database with schema
async fn create_test_db() -> (Repository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let pool = create_pool(&db_path).await.unwrap();
    let repo = Repository::new(pool);

    (repo, temp_dir)
}

#[derive(Default)]
struct RecordingSurface {
    shown: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationSurface for RecordingSurface {
    async fn create_channel(&self, _channel: &NotificationChannel) -> Result<()> {
        Ok(())
    }

    async fn show(&self, notification: &Notification) -> Result<()> {
        self.shown.lock().await.push(notification.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_note_crud_operations() {
    let (repo, _temp) = create_test_db().await;
    let notes_service = NotesService::new(repo);

    // Create note
    let id = notes_service
        .create_note(Note::new("Buy milk", "2 liters", "Personal", "Red"))
        .await
        .unwrap();

    // List notes
    let notes = notes_service.list_notes().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, id);

    // Update note
    let mut note = notes_service.get_note(id).await.unwrap();
    note.title = "Buy milk and eggs".to_string();
    notes_service.update_note(note).await.unwrap();

    let retrieved = notes_service.get_note(id).await.unwrap();
    assert_eq!(retrieved.title, "Buy milk and eggs");

    // Delete note
    notes_service.delete_note(id).await.unwrap();

    let result = notes_service.get_note(id).await;
    assert!(matches!(result, Err(AppError::NoteNotFound(_))));

    // Deleting again is not an error
    notes_service.delete_note(id).await.unwrap();
}

#[tokio::test]
async fn test_older_note_inserted_later_sorts_after_newer() {
    let (repo, _temp) = create_test_db().await;
    let notes_service = NotesService::new(repo);

    let newer = Note {
        date: "2024-09-10 18:00".to_string(),
        ..Note::new("Newer", "content", "Work", "Red")
    };
    let older = Note {
        date: "2024-01-02 07:15".to_string(),
        ..Note::new("Older", "content", "Work", "Red")
    };

    notes_service.create_note(newer).await.unwrap();
    notes_service.create_note(older).await.unwrap();

    let titles: Vec<String> = notes_service
        .list_notes()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
}

#[tokio::test]
async fn test_search_functionality() {
    let (repo, _temp) = create_test_db().await;
    let notes_service = NotesService::new(repo);

    notes_service
        .create_note(Note::new("Shopping List", "Buy milk", "Personal", "Red"))
        .await
        .unwrap();
    notes_service
        .create_note(Note::new("Todo", "Fix bug", "Work", "Red"))
        .await
        .unwrap();
    notes_service
        .create_note(Note::new("Weekly sync", "Discuss project", "Meeting", "Red"))
        .await
        .unwrap();

    let all = notes_service.list_notes().await.unwrap();

    // Unfiltered view is the stored order
    assert_eq!(apply_filters(&all, "All", ""), all);

    // Search by title
    let results = apply_filters(&all, "All", "todo");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Todo");

    // Search by tag
    let results = apply_filters(&all, "All", "meeting");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Weekly sync");

    // Tag filter plus keyword
    let results = notes_service
        .list_filtered(&NoteFilter::new("Personal", "MILK"))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Shopping List");

    // No matches
    assert!(apply_filters(&all, "Work", "milk").is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reminder_fires_notification() {
    let temp_dir = TempDir::new().unwrap();
    let surface = Arc::new(RecordingSurface::default());
    let app = AppState::initialize(AppConfig::new(temp_dir.path()), surface.clone())
        .await
        .unwrap();

    let mut note = Note::new("Take out trash", "Tonight", "Personal", "Green");
    note.set_reminder(Some(chrono::Utc::now().timestamp_millis() + 200));

    let outcome = app.add_note(note, Some(NotifyMode::Sound)).await.unwrap();
    assert!(matches!(outcome.reminder, ReminderOutcome::Scheduled { .. }));

    // The note can go away before the reminder fires
    app.delete_note(outcome.note.id).await.unwrap();

    let mut note = Note::new("Water plants", "Balcony", "Personal", "Green");
    note.set_reminder(Some(chrono::Utc::now().timestamp_millis() + 200));
    let outcome = app.add_note(note, Some(NotifyMode::Sound)).await.unwrap();
    assert!(matches!(outcome.reminder, ReminderOutcome::Scheduled { .. }));

    for _ in 0..100 {
        if !surface.shown.lock().await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let shown = surface.shown.lock().await;
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "Reminder");
    assert_eq!(shown[0].body, "Water plants");
    assert!(shown[0].sound_enabled);
    drop(shown);

    // Fired registrations are forgotten
    for _ in 0..50 {
        if app.reminders_service.list_pending().await.unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(app.reminders_service.list_pending().await.unwrap().is_empty());

    app.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pending_reminders_rearmed_after_restart() {
    let temp_dir = TempDir::new().unwrap();
    let fire_at = chrono::Utc::now().timestamp_millis() + 3_600_000;

    {
        let app = AppState::initialize(
            AppConfig::new(temp_dir.path()),
            Arc::new(RecordingSurface::default()),
        )
        .await
        .unwrap();

        let mut note = Note::new("Renew passport", "Bring photos", "Important", "Red");
        note.set_reminder(Some(fire_at));
        let saved = app.add_note(note, Some(NotifyMode::Default)).await.unwrap();

        // Saving again with the same time keeps a single registration
        let again = app.edit_note(saved.note, None).await.unwrap();
        assert!(matches!(again.reminder, ReminderOutcome::Scheduled { .. }));
        assert_eq!(app.wake_timer().armed_count().await, 1);

        app.shutdown().await.unwrap();
    }

    let app = AppState::initialize(
        AppConfig::new(temp_dir.path()),
        Arc::new(RecordingSurface::default()),
    )
    .await
    .unwrap();

    let pending = app.reminders_service.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].fire_at, fire_at);
    assert_eq!(pending[0].title, "Renew passport");
    assert_eq!(app.wake_timer().armed_count().await, 1);
    assert!(app.wake_timer().is_armed(pending[0].request_id).await);

    app.shutdown().await.unwrap();
}
