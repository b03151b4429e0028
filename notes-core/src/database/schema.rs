//! Database schema and versioning
//!
//! This module handles database initialization and schema versioning.
//! Uses SQLite with WAL mode for better concurrency and crash safety.
//! There are no incremental migrations: a database at any other version is
//! dropped and recreated, losing its notes.

use crate::config::SCHEMA_VERSION;
use crate::error::Result;
use sqlx::sqlite::SqlitePool;

const SCHEMA_SQL: &str = include_str!("migrations/schema.sql");

/// Initialize database with schema
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Initializing database schema");

    // Enable WAL mode for better performance and crash safety
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(pool)
            .await?;

    tracing::info!("Current database version: {:?}", current_version);

    match current_version {
        Some(version) if version == SCHEMA_VERSION => {}
        Some(version) => {
            tracing::warn!(
                "Schema version {} is incompatible with {}, recreating tables",
                version,
                SCHEMA_VERSION
            );
            recreate_schema(pool).await?;
        }
        None => recreate_schema(pool).await?,
    }

    tracing::info!("Database initialization complete");
    Ok(())
}

/// Drop every table and build the current schema in one transaction
async fn recreate_schema(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Applying schema version {}", SCHEMA_VERSION);

    let mut tx = pool.begin().await?;

    sqlx::query("DROP TABLE IF EXISTS reminders")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS notes")
        .execute(&mut *tx)
        .await?;

    for statement in SCHEMA_SQL.split(';').filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    sqlx::query("DELETE FROM schema_version")
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Schema version {} applied successfully", SCHEMA_VERSION);
    Ok(())
}
