use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::Settings;

/// Opens the connection pool and brings the schema up to date.
#[tracing::instrument(name = "Initialize database", skip(settings), fields(max_connections = settings.max_connections))]
pub async fn init_db(settings: &Settings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.database_url)
        .with_context(|| format!("Invalid DATABASE_URL: {}", settings.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.query_timeout)
        .connect_with(options)
        .await
        .context("Failed to connect to the database")?;

    run_migrations(&pool).await?;

    tracing::info!("Database connected successfully");
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(())
}

/// Single-connection in-memory pool; every test gets its own database.
#[cfg(test)]
pub async fn init_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    run_migrations(&pool)
        .await
        .expect("Failed to migrate in-memory database");
    pool
}
