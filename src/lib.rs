//! RideLink Admin - Trust Score Engine
//!
//! Administrative service for a ride-sharing platform that turns raw
//! per-user activity counters into a bounded, categorized trust score,
//! serves ranking and outlier queries over it, and drives on-demand
//! recomputation with an audited before/after diff.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Server entrypoint
//! ├── config.rs      - Configuration management
//! ├── trust/         - Trust score engine
//! │   ├── score.rs      - Stats record, aggregation, calculator, banding
//! │   ├── breakdown.rs  - Per-component intermediate values
//! │   ├── ranking.rs    - Ranking & outlier queries, pagination contract
//! │   ├── recalc.rs     - Recalculation orchestrator + audit diff
//! │   ├── store.rs      - Store ports (stats source, score writer, audit)
//! │   └── error.rs      - Error taxonomy
//! ├── api/           - HTTP API endpoints
//! │   └── trust.rs   - Ranking/outlier/breakdown/recalculate routes
//! └── database/      - PostgreSQL persistence
//!     ├── pool.rs    - Connection pool & schema init
//!     ├── stats.rs   - Stats repository + in-store recompute routine
//!     └── audit.rs   - Append-only audit log
//! ```

pub mod api;
pub mod config;
pub mod database;
pub mod trust;

// Re-export main types for convenience
pub use api::{create_trust_router, TrustApiState};
pub use config::AdminConfig;
pub use database::{AuditRepository, DatabasePool, UserStatsRepository};
pub use trust::{
    calculate, compose, OutlierService, PaginatedResult, RankingFilter, RankingService,
    RecalculationOrchestrator, ScoreComponents, TrustBreakdown, TrustCategory, TrustError,
    TrustScore, UserStatsRecord, UserTrustSummary,
};
