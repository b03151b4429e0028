//! Repository layer for database operations
//!
//! This module provides CRUD operations for notes and persisted reminder
//! registrations. Every mutation is a single statement, so readers never
//! observe a partially written record. Validation lives one level up in
//! [`crate::services::NotesService`].

use super::models::*;
use crate::error::{AppError, Result};
use sqlx::SqlitePool;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a note and return its assigned id. `note.id` is ignored.
    pub async fn insert_note(&self, note: &Note) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO notes (title, content, date, tag, color, isCompleted, imagePath, reminderTime, reminderDate)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.date)
        .bind(&note.tag)
        .bind(&note.color)
        .bind(note.is_completed)
        .bind(&note.image_path)
        .bind(&note.reminder_time)
        .bind(&note.reminder_date)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Inserted note: {}", id);
        Ok(id)
    }

    /// Get a note by ID
    pub async fn get_note(&self, id: i64) -> Result<Note> {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NoteNotFound(id))?;

        Ok(note)
    }

    /// List all notes, newest creation date first, ties in insertion order
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes
            ORDER BY date DESC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// Replace every mutable column of the note with `note.id`.
    ///
    /// The creation `date` is never rewritten.
    pub async fn update_note(&self, note: &Note) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE notes
            SET title = ?, content = ?, tag = ?, color = ?, isCompleted = ?,
                imagePath = ?, reminderTime = ?, reminderDate = ?
            WHERE id = ?
            "#,
        )
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.tag)
        .bind(&note.color)
        .bind(note.is_completed)
        .bind(&note.image_path)
        .bind(&note.reminder_time)
        .bind(&note.reminder_date)
        .bind(note.id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NoteNotFound(note.id));
        }

        tracing::debug!("Updated note: {}", note.id);
        Ok(())
    }

    /// Set only the completion flag
    pub async fn update_note_status(&self, id: i64, is_completed: bool) -> Result<()> {
        let rows_affected = sqlx::query("UPDATE notes SET isCompleted = ? WHERE id = ?")
            .bind(is_completed)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NoteNotFound(id));
        }

        tracing::debug!("Set note {} completed = {}", id, is_completed);
        Ok(())
    }

    /// Permanently delete a note. Returns whether a row was removed.
    pub async fn delete_note(&self, id: i64) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted note: {} ({} rows)", id, rows);
        Ok(rows > 0)
    }

    /// Store a reminder registration, replacing any row with the same request id
    pub async fn upsert_reminder(&self, registration: &ReminderRegistration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders (request_id, note_id, fire_at, title, notify_mode, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(request_id) DO UPDATE SET
                note_id = excluded.note_id,
                fire_at = excluded.fire_at,
                title = excluded.title,
                notify_mode = excluded.notify_mode,
                created_at = excluded.created_at
            "#,
        )
        .bind(registration.request_id)
        .bind(registration.note_id)
        .bind(registration.fire_at)
        .bind(&registration.title)
        .bind(registration.notify_mode.as_str())
        .bind(registration.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            "Stored reminder {} for note {}",
            registration.request_id,
            registration.note_id
        );
        Ok(())
    }

    /// All persisted registrations, soonest first
    pub async fn list_reminders(&self) -> Result<Vec<ReminderRegistration>> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT * FROM reminders ORDER BY fire_at ASC, request_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReminderRegistration::from).collect())
    }

    pub async fn list_reminders_for_note(&self, note_id: i64) -> Result<Vec<ReminderRegistration>> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT * FROM reminders WHERE note_id = ? ORDER BY fire_at ASC",
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReminderRegistration::from).collect())
    }

    pub async fn delete_reminder(&self, request_id: i32) -> Result<()> {
        sqlx::query("DELETE FROM reminders WHERE request_id = ?")
            .bind(request_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Deleted reminder: {}", request_id);
        Ok(())
    }

    /// Remove a registration only if it has not been replaced since it was armed
    pub async fn delete_fired_reminder(&self, registration: &ReminderRegistration) -> Result<bool> {
        let rows = sqlx::query(
            "DELETE FROM reminders WHERE request_id = ? AND note_id = ? AND fire_at = ?",
        )
        .bind(registration.request_id)
        .bind(registration.note_id)
        .bind(registration.fire_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }
}
