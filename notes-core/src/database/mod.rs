//! Note storage
//!
//! A single SQLite file holds the `notes` and `reminders` tables. There are
//! no incremental migrations: the stored schema version is compared with
//! `SCHEMA_VERSION` on open and any mismatch drops and recreates both tables.

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::initialize_database;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// Connections the application pool may hold
const POOL_SIZE: u32 = 5;

/// Open the note database at `db_path`, creating the file and its directory
/// when missing.
///
/// The version check runs alone on one connection and finishes before the
/// application pool opens, so a recreate never races a live query.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::info!("Opening note database at {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let check = open_pool(db_path, 1).await?;
    initialize_database(&check).await?;
    check.close().await;

    let pool = open_pool(db_path, POOL_SIZE).await?;
    tracing::debug!("Note database ready ({} connections)", POOL_SIZE);

    Ok(pool)
}

async fn open_pool(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}
