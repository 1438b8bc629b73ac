//! Error taxonomy for the trust engine
//!
//! Validation failures are rejected before any store access; the
//! calculator and breakdown composer are total and never appear here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrustError {
    /// No stats recorded for the given user. Surfaced, not retried.
    #[error("no stats recorded for user {0}")]
    NotFound(String),

    /// The store's authoritative recompute routine errored. Surfaced
    /// without retry; no audit record is written on this path.
    #[error("authoritative recalculation failed: {0}")]
    RecalculationFailed(String),

    /// Malformed filter or pagination bounds, rejected up front.
    #[error("{0}")]
    Validation(String),

    /// Underlying store failure on a read path.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl TrustError {
    pub fn validation(message: impl Into<String>) -> Self {
        TrustError::Validation(message.into())
    }
}
