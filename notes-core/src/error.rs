//! Error types for the notes core
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to a UI layer as plain strings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    #[error("Scheduling unavailable: {0}")]
    SchedulingUnavailable(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Whether the caller can recover by re-prompting or refreshing its view.
    ///
    /// Storage and IO failures are surfaced as-is and never retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::NoteNotFound(_)
                | AppError::SchedulingUnavailable(_)
                | AppError::Notification(_)
        )
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
