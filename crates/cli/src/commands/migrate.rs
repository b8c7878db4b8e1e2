//! Database migration command.
//!
//! Applies `crates/api/migrations/` to the database named by
//! `TEAKSPICE_DATABASE_URL` (or `DATABASE_URL`). Already-applied migrations
//! are skipped.

use thiserror::Error;
use tracing::info;

use teakspice_api::db::create_pool;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: TEAKSPICE_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url().ok_or(MigrationError::MissingDatabaseUrl)?;

    info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    info!("Migrations complete!");
    pool.close().await;
    Ok(())
}
