//! Trust Score Engine
//!
//! Converts raw per-user activity counters into a bounded, categorized
//! reputation score, serves ranking/outlier queries over it, and drives
//! on-demand recomputation with an audit trail.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────────┐     ┌──────────────────┐
//! │ StatsSource  │────►│ calculate / compose  │────►│ RankingService   │
//! │ (ext. store) │     │ (pure, shared aggr.) │     │ OutlierService   │
//! └──────────────┘     └─────────────────────┘     └──────────────────┘
//!         │                                                 read paths
//!         ▼
//! ┌──────────────────────────┐     ┌──────────────┐
//! │ RecalculationOrchestrator│────►│ AuditSink    │
//! │ (delegates the write to  │     │ (typed diff) │
//! │  the store's routine)    │     └──────────────┘
//! └──────────────────────────┘
//! ```
//!
//! ## Score Model
//!
//! - Four components: rating 0-30, completion 0-25, reliability 0-25,
//!   experience 0-20; total clamped to [0, 100]
//! - Rider and passenger counters are merged first; the average rating is
//!   a count-weighted mean across the two roles
//! - Category banding on the total: >=80 Excellent, >=60 Good,
//!   >=40 Fair, else Poor
//! - The persisted score has a single writer: the store's own recompute
//!   routine. Read paths derive, never store.

mod breakdown;
mod error;
mod ranking;
mod recalc;
mod score;
mod store;

pub use breakdown::{
    compose, CompletionBreakdown, ExperienceBreakdown, RatingBreakdown, ReliabilityBreakdown,
    TrustBreakdown,
};
pub use error::TrustError;
pub use ranking::{
    OutlierService, PaginatedResult, RankingFilter, RankingService, UserTrustSummary,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use recalc::{RecalculationOrchestrator, RECALCULATE_ACTION, USER_ENTITY};
pub use score::{
    calculate, AggregateStats, RoleStats, ScoreComponents, TrustCategory, TrustScore,
    UserStatsRecord,
};
pub use store::{
    AuditSink, ListQuery, PageWindow, ScoreOrder, ScoreSelection, ScoreStore, StatsSource,
    TrustScoreSnapshot,
};
