//! Recalculation Orchestrator
//!
//! Triggers the store's authoritative recompute for one user and records
//! the before/after audit diff. The orchestrator never writes the
//! persisted score itself; it reads, delegates, re-reads, and reports.
//!
//! The two reads happen at different times. If ride or rating activity
//! mutates the counters in between, the breakdown in the audit record may
//! not exactly match the counters that produced the persisted score.
//! That is an accepted eventual-consistency property of the design; no
//! locking is added to close the window.

use std::sync::Arc;

use tracing::{info, warn};

use crate::trust::breakdown::{compose, TrustBreakdown};
use crate::trust::error::TrustError;
use crate::trust::score::TrustScore;
use crate::trust::store::{AuditSink, ScoreStore, TrustScoreSnapshot};

pub const RECALCULATE_ACTION: &str = "trust.recalculate";
pub const USER_ENTITY: &str = "user";

pub struct RecalculationOrchestrator {
    store: Arc<dyn ScoreStore>,
    audit: Arc<dyn AuditSink>,
}

impl RecalculationOrchestrator {
    pub fn new(store: Arc<dyn ScoreStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    /// Recompute the persisted score for `uid` on behalf of `admin_id`.
    ///
    /// Returns the score portion of the post-recompute breakdown. The
    /// audit record carries the persisted score as the after-value and
    /// the locally derived components as an unpersisted cross-check.
    pub async fn recalculate(&self, uid: &str, admin_id: &str) -> Result<TrustScore, TrustError> {
        let current = self
            .store
            .get(uid)
            .await?
            .ok_or_else(|| TrustError::NotFound(uid.to_string()))?;
        let old_score = current.trust_score;

        let new_score = self
            .store
            .recompute_authoritative(uid)
            .await
            .map_err(|e| TrustError::RecalculationFailed(e.to_string()))?;

        let refreshed = self
            .store
            .get(uid)
            .await?
            .ok_or_else(|| TrustError::NotFound(uid.to_string()))?;
        let breakdown: TrustBreakdown = compose(&refreshed);

        info!(
            uid = %uid,
            admin = %admin_id,
            old_score,
            new_score,
            "Trust score recalculated"
        );

        // The score change is committed once the store confirms it; a
        // failed audit write is logged and does not fail the operation.
        let before = TrustScoreSnapshot::score_only(old_score);
        let after =
            TrustScoreSnapshot::with_components(new_score, breakdown.score.components);
        if let Err(e) = self
            .audit
            .record(admin_id, RECALCULATE_ACTION, USER_ENTITY, uid, &before, &after)
            .await
        {
            warn!(uid = %uid, error = %e, "Audit write failed after recalculation");
        }

        Ok(breakdown.score)
    }
}
