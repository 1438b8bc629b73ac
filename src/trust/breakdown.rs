//! Trust Breakdown Composer
//!
//! Wraps the calculator with the intermediate quantities each component
//! was derived from, for the admin breakdown view and the recalculation
//! audit diff. Shares the aggregation step with the calculator so the
//! reported inputs are exactly the ones that produced the score.

use serde::{Deserialize, Serialize};

use crate::trust::score::{
    reliability_deduction, score_from_aggregate, AggregateStats, TrustScore, UserStatsRecord,
};

/// Inputs behind the rating component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingBreakdown {
    /// Count-weighted mean across both roles (0.0 when unrated)
    pub average_rating: f64,
    pub total_ratings: u32,
}

/// Inputs behind the completion component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionBreakdown {
    /// completed / total, 0.0 when the user has no rides
    pub completion_rate: f64,
    pub completed_rides: u32,
    pub total_rides: u32,
}

/// Inputs behind the reliability component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityBreakdown {
    pub cancelled_rides: u32,
    pub late_cancellations: u32,
    pub no_shows: u32,
    /// Raw deduction before the zero floor
    pub deduction: u32,
}

/// Inputs behind the experience component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceBreakdown {
    pub total_rides: u32,
}

/// Full score plus per-component intermediates. Display and audit only,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustBreakdown {
    pub score: TrustScore,
    pub rating: RatingBreakdown,
    pub completion: CompletionBreakdown,
    pub reliability: ReliabilityBreakdown,
    pub experience: ExperienceBreakdown,
}

/// Compose a breakdown for a stats record. `breakdown.score` is always
/// identical to what `calculate` alone would return.
pub fn compose(stats: &UserStatsRecord) -> TrustBreakdown {
    let agg = AggregateStats::from_record(stats);
    let score = score_from_aggregate(stats, &agg);

    let completion_rate = if agg.total_rides == 0 {
        0.0
    } else {
        agg.completed_rides as f64 / agg.total_rides as f64
    };

    TrustBreakdown {
        score,
        rating: RatingBreakdown {
            average_rating: agg.average_rating,
            total_ratings: agg.total_ratings,
        },
        completion: CompletionBreakdown {
            completion_rate,
            completed_rides: agg.completed_rides,
            total_rides: agg.total_rides,
        },
        reliability: ReliabilityBreakdown {
            cancelled_rides: agg.cancelled_rides,
            late_cancellations: stats.late_cancellations,
            no_shows: stats.no_shows,
            deduction: reliability_deduction(stats, &agg),
        },
        experience: ExperienceBreakdown {
            total_rides: agg.total_rides,
        },
    }
}
