//! Store Ports
//!
//! Trait seams between the trust services and the external stores, so
//! services are built against injected clients and tests can substitute
//! in-memory fakes. The Postgres adapters live in `crate::database`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::trust::score::{ScoreComponents, UserStatsRecord};

/// Which slice of the score axis a listing selects
#[derive(Debug, Clone, Copy)]
pub enum ScoreSelection {
    All,
    /// Inclusive band: `score >= min` and/or `score <= max`
    Range { min: Option<u32>, max: Option<u32> },
    /// Outside a band: `score < below OR score > above`
    Outside { below: Option<u32>, above: Option<u32> },
}

#[derive(Debug, Clone, Copy)]
pub enum ScoreOrder {
    Descending,
    Ascending,
}

/// Offset/limit window for a listing. `None` means unpaginated.
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Listing request against the stats store
#[derive(Debug, Clone, Copy)]
pub struct ListQuery {
    pub selection: ScoreSelection,
    pub order: ScoreOrder,
    pub window: Option<PageWindow>,
}

/// Read-only access to user activity stats
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch the stats record for one user, `None` when absent.
    async fn get(&self, uid: &str) -> anyhow::Result<Option<UserStatsRecord>>;

    /// List records matching the query, plus the total match count
    /// ignoring the page window.
    async fn list(&self, query: &ListQuery) -> anyhow::Result<(Vec<UserStatsRecord>, u64)>;
}

/// The store's authoritative scoring routine. The single writer of the
/// persisted `trust_score` field; nothing in this crate writes it.
#[async_trait]
pub trait ScoreStore: StatsSource {
    /// Recompute and persist the score for one user, returning the new
    /// persisted value.
    async fn recompute_authoritative(&self, uid: &str) -> anyhow::Result<i32>;
}

/// Typed before/after payload for the audit diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustScoreSnapshot {
    pub trust_score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ScoreComponents>,
}

impl TrustScoreSnapshot {
    pub fn score_only(trust_score: i32) -> Self {
        Self {
            trust_score,
            components: None,
        }
    }

    pub fn with_components(trust_score: i32, components: ScoreComponents) -> Self {
        Self {
            trust_score,
            components: Some(components),
        }
    }
}

/// Append-only audit trail consumer. Fire-and-forget from the caller's
/// perspective; a failed write is logged by the caller, never rolled
/// back into the operation that produced it.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(
        &self,
        admin_id: &str,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        before: &TrustScoreSnapshot,
        after: &TrustScoreSnapshot,
    ) -> anyhow::Result<()>;
}
