//! Audit Repository
//!
//! Append-only audit trail for administrative actions, with the typed
//! before/after score snapshots stored as JSONB.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::trust::{AuditSink, TrustScoreSnapshot};

pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.audit_log (
                id UUID PRIMARY KEY,
                admin_id VARCHAR(255) NOT NULL,
                action VARCHAR(100) NOT NULL,
                entity_type VARCHAR(100) NOT NULL,
                entity_id VARCHAR(255) NOT NULL,
                before_state JSONB NOT NULL,
                after_state JSONB NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create audit_log table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_audit_log_entity \
             ON trust.audit_log(entity_type, entity_id)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create audit_log entity index")?;

        info!("Audit log schema initialized");
        Ok(())
    }
}

#[async_trait]
impl AuditSink for AuditRepository {
    async fn record(
        &self,
        admin_id: &str,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        before: &TrustScoreSnapshot,
        after: &TrustScoreSnapshot,
    ) -> anyhow::Result<()> {
        let before_state =
            serde_json::to_value(before).context("Failed to serialize before snapshot")?;
        let after_state =
            serde_json::to_value(after).context("Failed to serialize after snapshot")?;

        sqlx::query(
            r#"
            INSERT INTO trust.audit_log
                (id, admin_id, action, entity_type, entity_id, before_state, after_state, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(admin_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(before_state)
        .bind(after_state)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to insert audit record")?;

        debug!(
            admin = %admin_id,
            action = %action,
            entity = %entity_id,
            "Audit record written"
        );
        Ok(())
    }
}
