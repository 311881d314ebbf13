// src/db.rs
use crate::config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Lazily connecting pool: the proxy comes up even when Postgres is not
/// reachable yet, and token checks fail until it is.
pub fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(2))
        .idle_timeout(Duration::from_secs(30))
        .connect_lazy(&config.url())?;

    tracing::info!(
        "Database pool configured for {}:{}/{}",
        config.host,
        config.port,
        config.name
    );

    Ok(pool)
}

pub async fn test_connection(pool: &PgPool) -> bool {
    match sqlx::query("SELECT NOW()").execute(pool).await {
        Ok(_) => {
            tracing::info!("✓ Database connection successful");
            true
        }
        Err(e) => {
            tracing::error!("✗ Database connection failed: {}", e);
            false
        }
    }
}
