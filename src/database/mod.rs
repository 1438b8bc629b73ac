//! PostgreSQL Persistence Module
//!
//! Adapters implementing the trust-engine store ports: user activity
//! stats (including the authoritative recompute routine) and the
//! append-only audit log.

pub mod audit;
pub mod pool;
pub mod stats;

pub use audit::AuditRepository;
pub use pool::DatabasePool;
pub use stats::UserStatsRepository;
