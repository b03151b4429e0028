//! Notes service
//!
//! High-level business logic for notes operations.
//! Validates and normalizes records before they reach the repository.

use crate::config::{DEFAULT_COLOR, DEFAULT_TAG, NOTE_DATE_FORMAT};
use crate::database::{format_reminder_date, now_note_date, Note, Repository};
use crate::error::{AppError, Result};
use crate::services::filter::NoteFilter;
use chrono::NaiveDateTime;

/// Service for managing notes
#[derive(Clone)]
pub struct NotesService {
    repo: Repository,
}

impl NotesService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a new note and return its id
    ///
    /// A blank `date` is stamped with the current local time; any other
    /// value must be `yyyy-MM-dd HH:mm`.
    pub async fn create_note(&self, note: Note) -> Result<i64> {
        let mut note = normalize(note)?;
        note.date = note.date.trim().to_string();
        if note.date.is_empty() {
            note.date = now_note_date();
        } else if NaiveDateTime::parse_from_str(&note.date, NOTE_DATE_FORMAT).is_err() {
            // Sorting compares dates as text, which only works in this format
            return Err(AppError::Validation(format!(
                "Invalid date {:?}, expected yyyy-MM-dd HH:mm",
                note.date
            )));
        }

        tracing::info!("Creating new note: {}", note.title);

        let id = self.repo.insert_note(&note).await?;

        tracing::info!("Note created successfully: {}", id);

        Ok(id)
    }

    /// Get a note by ID
    pub async fn get_note(&self, id: i64) -> Result<Note> {
        self.repo.get_note(id).await
    }

    /// List all notes, most recently created first
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        self.repo.list_notes().await
    }

    /// Replace a stored note. Its creation date is kept.
    pub async fn update_note(&self, note: Note) -> Result<Note> {
        tracing::debug!("Updating note: {}", note.id);

        let note = normalize(note)?;
        self.repo.update_note(&note).await?;

        tracing::debug!("Note updated successfully: {}", note.id);

        self.repo.get_note(note.id).await
    }

    /// Toggle completion without touching any other field
    pub async fn update_note_status(&self, id: i64, is_completed: bool) -> Result<()> {
        self.repo.update_note_status(id, is_completed).await
    }

    /// Delete a note permanently. Deleting a missing note succeeds.
    pub async fn delete_note(&self, id: i64) -> Result<()> {
        tracing::info!("Deleting note: {}", id);

        if self.repo.delete_note(id).await? {
            tracing::info!("Note deleted successfully: {}", id);
        } else {
            tracing::debug!("Note {} was already gone", id);
        }

        Ok(())
    }

    /// Notes visible under the given filter state
    pub async fn list_filtered(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let all_notes = self.list_notes().await?;

        if filter.is_unfiltered() {
            return Ok(all_notes);
        }

        Ok(filter.apply(&all_notes))
    }
}

/// Trim user text, fill defaults and keep the reminder fields in step
fn normalize(mut note: Note) -> Result<Note> {
    note.title = note.title.trim().to_string();
    note.content = note.content.trim().to_string();

    if note.title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if note.content.is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }

    note.tag = or_default(&note.tag, DEFAULT_TAG);
    note.color = or_default(&note.color, DEFAULT_COLOR);

    let reminder_time = note.reminder_time.trim().to_string();
    if reminder_time.is_empty() {
        note.reminder_time.clear();
        note.reminder_date.clear();
        return Ok(note);
    }

    let millis: i64 = reminder_time
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid reminder time: {}", reminder_time)))?;
    note.reminder_time = reminder_time;

    // An existing display date is kept as-is; only a missing one is derived
    if note.reminder_date.trim().is_empty() {
        note.reminder_date = format_reminder_date(millis)
            .ok_or_else(|| AppError::Validation(format!("Invalid reminder time: {}", millis)))?;
    }

    Ok(note)
}

fn or_default(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}
