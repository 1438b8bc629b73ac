//! Ranking and Outlier Queries
//!
//! Read paths over the persisted trust score. Both services validate
//! their bounds before touching the store and compute the category from
//! the banding formula on the way out; nothing here ever writes a score.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::trust::error::TrustError;
use crate::trust::score::{AggregateStats, TrustCategory, UserStatsRecord};
use crate::trust::store::{ListQuery, PageWindow, ScoreOrder, ScoreSelection, StatsSource};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Row shape for ranking and outlier listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTrustSummary {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub trust_score: i32,
    pub category: TrustCategory,
    pub total_rides: u32,
    pub completed_rides: u32,
    pub average_rating: f64,
}

impl UserTrustSummary {
    pub fn from_record(record: &UserStatsRecord) -> Self {
        let agg = AggregateStats::from_record(record);
        Self {
            uid: record.uid.clone(),
            display_name: record.display_name.clone(),
            email: record.email.clone(),
            trust_score: record.trust_score,
            category: TrustCategory::from_total(record.trust_score.max(0) as u32),
            total_rides: agg.total_rides,
            completed_rides: agg.completed_rides,
            average_rating: agg.average_rating,
        }
    }
}

/// Score band filter for ranking queries
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingFilter {
    pub min_score: Option<i64>,
    pub max_score: Option<i64>,
}

/// 1-indexed page of results with totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

fn checked_score_bound(value: Option<i64>, name: &str) -> Result<Option<u32>, TrustError> {
    match value {
        None => Ok(None),
        Some(v) if (0..=100).contains(&v) => Ok(Some(v as u32)),
        Some(v) => Err(TrustError::validation(format!(
            "{} must be between 0 and 100, got {}",
            name, v
        ))),
    }
}

/// Paginated, score-filtered, score-descending listing over all users
/// with stats
pub struct RankingService {
    source: Arc<dyn StatsSource>,
}

impl RankingService {
    pub fn new(source: Arc<dyn StatsSource>) -> Self {
        Self { source }
    }

    pub async fn rank(
        &self,
        filter: RankingFilter,
        page: u32,
        page_size: u32,
    ) -> Result<PaginatedResult<UserTrustSummary>, TrustError> {
        let min = checked_score_bound(filter.min_score, "minScore")?;
        let max = checked_score_bound(filter.max_score, "maxScore")?;
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(TrustError::validation(format!(
                    "minScore {} exceeds maxScore {}",
                    min, max
                )));
            }
        }
        if page == 0 {
            return Err(TrustError::validation("page must be at least 1"));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(TrustError::validation(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let query = ListQuery {
            selection: ScoreSelection::Range { min, max },
            order: ScoreOrder::Descending,
            window: Some(PageWindow {
                offset: (page as u64 - 1) * page_size as u64,
                limit: page_size as u64,
            }),
        };

        let (records, total) = self.source.list(&query).await?;
        debug!(total, page, page_size, "Ranking query served");

        let items = records.iter().map(UserTrustSummary::from_record).collect();

        Ok(PaginatedResult {
            items,
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size as u64),
        })
    }
}

/// Threshold-based selection of users outside an acceptable score band
pub struct OutlierService {
    source: Arc<dyn StatsSource>,
}

impl OutlierService {
    pub fn new(source: Arc<dyn StatsSource>) -> Self {
        Self { source }
    }

    /// `score < below OR score > above`, ascending by score. Callers are
    /// expected to bound the thresholds tightly; with neither bound this
    /// returns an empty list rather than the entire population.
    pub async fn outliers(
        &self,
        below: Option<i64>,
        above: Option<i64>,
    ) -> Result<Vec<UserTrustSummary>, TrustError> {
        let below = checked_score_bound(below, "below")?;
        let above = checked_score_bound(above, "above")?;

        if below.is_none() && above.is_none() {
            return Ok(Vec::new());
        }

        let query = ListQuery {
            selection: ScoreSelection::Outside { below, above },
            order: ScoreOrder::Ascending,
            window: None,
        };

        let (records, total) = self.source.list(&query).await?;
        debug!(total, ?below, ?above, "Outlier query served");

        Ok(records.iter().map(UserTrustSummary::from_record).collect())
    }
}
