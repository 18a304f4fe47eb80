use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::{AppError, Result};

const IMPORT_SCHEMA: &str = include_str!("../../../resources/import/schema.sql");

const IMPORT_SCHEMA_VERSION: i32 = 1;

/// Open a pool on `database_url` and bring the schema up to date
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::ConfigError(format!("Failed to parse database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .map_err(|e| AppError::StorageUnavailable(format!("Failed to connect: {}", e)))?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Private in-memory database. One connection that never expires, since each
/// SQLite memory connection is its own database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| AppError::ConfigError(format!("Failed to parse database URL: {}", e)))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| AppError::StorageUnavailable(format!("Failed to connect: {}", e)))?;

    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    let current: i32 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to read user_version: {}", e)))?;

    // Refuse to touch a database written by a newer schema.
    if current > IMPORT_SCHEMA_VERSION {
        return Err(AppError::DatabaseError(format!(
            "Database schema too new: user_version={} > supported={}",
            current, IMPORT_SCHEMA_VERSION
        )));
    }

    for statement in IMPORT_SCHEMA.split(';') {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema: {}", e)))?;
    }

    sqlx::query(&format!("PRAGMA user_version = {}", IMPORT_SCHEMA_VERSION))
        .execute(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to set user_version: {}", e)))?;

    Ok(())
}
