//! Trust Score Types and Calculator
//!
//! Converts raw per-user activity counters into a bounded 0-100 score
//! made of four weighted components. The calculator is a pure function:
//! no I/O, no clock, identical output for identical input whether it is
//! invoked for ranking display or for the recalculation audit diff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity counters for one role (rider or passenger)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleStats {
    pub rides_taken: u32,
    pub rides_completed: u32,
    pub rides_cancelled: u32,

    /// Average rating received in this role (1.0-5.0, meaningless when
    /// `ratings_count` is zero)
    pub average_rating: f64,
    pub ratings_count: u32,
}

/// Raw activity record for a user, as persisted by the ride/rating
/// subsystems. Owned by the external store; this core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatsRecord {
    pub uid: String,
    pub display_name: String,
    pub email: String,

    pub rider: RoleStats,
    pub passenger: RoleStats,

    /// Reliability counters (not role-split)
    pub late_cancellations: u32,
    pub no_shows: u32,

    /// Cached authoritative score, always in [0, 100]. Written only by
    /// the store's recompute routine, never by read paths.
    pub trust_score: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role counters merged into the quantities the component formulas use.
///
/// Shared by the calculator and the breakdown composer so the two can
/// never drift apart on aggregation.
#[derive(Debug, Clone, Copy)]
pub struct AggregateStats {
    pub total_rides: u32,
    pub completed_rides: u32,
    pub cancelled_rides: u32,
    pub total_ratings: u32,

    /// Count-weighted mean of the two role averages. A plain average of
    /// the two averages would let a tiny sample swing the score, so the
    /// weighting is part of the contract. Zero when there are no ratings.
    pub average_rating: f64,
}

impl AggregateStats {
    pub fn from_record(stats: &UserStatsRecord) -> Self {
        let total_ratings = stats.rider.ratings_count + stats.passenger.ratings_count;

        let average_rating = if total_ratings == 0 {
            0.0
        } else {
            let weighted = stats.rider.average_rating * stats.rider.ratings_count as f64
                + stats.passenger.average_rating * stats.passenger.ratings_count as f64;
            weighted / total_ratings as f64
        };

        Self {
            total_rides: stats.rider.rides_taken + stats.passenger.rides_taken,
            completed_rides: stats.rider.rides_completed + stats.passenger.rides_completed,
            cancelled_rides: stats.rider.rides_cancelled + stats.passenger.rides_cancelled,
            total_ratings,
            average_rating,
        }
    }
}

/// The four weighted sub-scores summed to form the total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// 0-30
    pub rating: u32,
    /// 0-25
    pub completion: u32,
    /// 0-25
    pub reliability: u32,
    /// 0-20
    pub experience: u32,
}

impl ScoreComponents {
    pub fn sum(&self) -> u32 {
        self.rating + self.completion + self.reliability + self.experience
    }
}

/// Coarse label derived purely from the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl TrustCategory {
    /// Banding thresholds as enforced by the scoring formula: 80/60/40.
    /// A product document elsewhere states 90/70/50; treated as a pending
    /// product decision, not adopted here.
    pub fn from_total(total: u32) -> Self {
        if total >= 80 {
            TrustCategory::Excellent
        } else if total >= 60 {
            TrustCategory::Good
        } else if total >= 40 {
            TrustCategory::Fair
        } else {
            TrustCategory::Poor
        }
    }
}

/// Derived reputation score. Never persisted as a whole; only the total
/// lives in the store, written by the authoritative recompute routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustScore {
    pub total: u32,
    pub category: TrustCategory,
    pub components: ScoreComponents,
}

const RATING_MAX: u32 = 30;
const RATING_BASELINE: u32 = 15;
const COMPLETION_MAX: u32 = 25;
const COMPLETION_BASELINE: u32 = 20;
const RELIABILITY_MAX: u32 = 25;
const EXPERIENCE_MAX: u32 = 20;
const EXPERIENCE_BASELINE: u32 = 10;

/// Compute the trust score for a stats record. Total over all
/// well-formed input, including all-zero counters.
pub fn calculate(stats: &UserStatsRecord) -> TrustScore {
    let agg = AggregateStats::from_record(stats);
    score_from_aggregate(stats, &agg)
}

/// Calculator core over a pre-built aggregate, so the breakdown composer
/// can reuse the exact same aggregation it reports.
pub(crate) fn score_from_aggregate(stats: &UserStatsRecord, agg: &AggregateStats) -> TrustScore {
    let components = ScoreComponents {
        rating: rating_component(agg),
        completion: completion_component(agg),
        reliability: reliability_component(stats, agg),
        experience: experience_component(agg),
    };

    let total = components.sum().min(100);

    TrustScore {
        total,
        category: TrustCategory::from_total(total),
        components,
    }
}

/// Rating component (0-30): round(weighted avg * 6), or the new-account
/// baseline when no ratings exist yet.
fn rating_component(agg: &AggregateStats) -> u32 {
    if agg.total_ratings == 0 {
        return RATING_BASELINE;
    }
    ((agg.average_rating * 6.0).round().max(0.0) as u32).min(RATING_MAX)
}

/// Completion component (0-25): completion rate scaled, baseline for
/// accounts with no rides yet.
fn completion_component(agg: &AggregateStats) -> u32 {
    if agg.total_rides == 0 {
        return COMPLETION_BASELINE;
    }
    let rate = agg.completed_rides as f64 / agg.total_rides as f64;
    ((rate * COMPLETION_MAX as f64).round() as u32).min(COMPLETION_MAX)
}

/// Reliability component (0-25): starts at the maximum, deductions for
/// cancellations, late cancellations and no-shows, floored at zero.
fn reliability_component(stats: &UserStatsRecord, agg: &AggregateStats) -> u32 {
    RELIABILITY_MAX.saturating_sub(reliability_deduction(stats, agg))
}

/// The raw deduction before flooring, exposed for the breakdown view.
pub(crate) fn reliability_deduction(stats: &UserStatsRecord, agg: &AggregateStats) -> u32 {
    agg.cancelled_rides * 2 + stats.late_cancellations * 5 + stats.no_shows * 10
}

/// Experience component (0-20): graduated by total ride count.
fn experience_component(agg: &AggregateStats) -> u32 {
    match agg.total_rides {
        0 => EXPERIENCE_BASELINE,
        n if n >= 10 => EXPERIENCE_MAX,
        n => EXPERIENCE_BASELINE + n,
    }
}
