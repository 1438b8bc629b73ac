//! Database Connection Pool using sqlx

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::database::audit::AuditRepository;
use crate::database::stats::UserStatsRepository;

pub struct DatabasePool {
    pool: PgPool,
    stats: Arc<UserStatsRepository>,
    audit: Arc<AuditRepository>,
}

impl DatabasePool {
    pub async fn new(connection_string: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;

        info!("Connected to PostgreSQL");

        let stats = Arc::new(UserStatsRepository::new(pool.clone()));
        let audit = Arc::new(AuditRepository::new(pool.clone()));

        Ok(Self { pool, stats, audit })
    }

    /// Idempotent schema initialization, run on boot.
    pub async fn init_schema(&self) -> anyhow::Result<()> {
        info!("Initializing database schema...");

        sqlx::query("CREATE SCHEMA IF NOT EXISTS trust")
            .execute(&self.pool)
            .await
            .context("Failed to create trust schema")?;

        self.stats.init_schema().await?;
        self.audit.init_schema().await?;

        info!("Database schema initialized");
        Ok(())
    }

    pub fn stats(&self) -> Arc<UserStatsRepository> {
        self.stats.clone()
    }

    pub fn audit(&self) -> Arc<AuditRepository> {
        self.audit.clone()
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
