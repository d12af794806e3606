//! Connection pool and schema migrations.

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::PoolConfig;
use crate::domain::foundation::DomainError;

/// Opens a connection pool to `url` sized by `pool`.
pub async fn connect(url: &str, pool: &PoolConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .min_connections(pool.min)
        .max_connections(pool.max)
        .acquire_timeout(pool.acquire_timeout())
        .idle_timeout(pool.idle_timeout())
        .connect(url)
        .await
        .map_err(|e| DomainError::database("connect to database", e))
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::database("run migrations", e))?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
