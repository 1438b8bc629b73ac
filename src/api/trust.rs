//! Trust API Endpoints
//!
//! The four admin-surface operations: ranking, outliers, per-user
//! breakdown, and on-demand recalculation.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::{error_response, ApiFailure, Envelope};
use crate::trust::{
    compose, OutlierService, PaginatedResult, RankingFilter, RankingService,
    RecalculationOrchestrator, StatsSource, TrustBreakdown, TrustError, TrustScore,
    UserTrustSummary, DEFAULT_PAGE_SIZE,
};

/// API state for the trust endpoints
#[derive(Clone)]
pub struct TrustApiState {
    pub stats: Arc<dyn StatsSource>,
    pub ranking: Arc<RankingService>,
    pub outliers: Arc<OutlierService>,
    pub recalc: Arc<RecalculationOrchestrator>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingQuery {
    pub min_score: Option<i64>,
    pub max_score: Option<i64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct OutlierQuery {
    pub below: Option<i64>,
    pub above: Option<i64>,
}

/// GET /trust/ranking - paginated, score-descending user listing
pub async fn get_ranking(
    State(state): State<TrustApiState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Envelope<PaginatedResult<UserTrustSummary>>>, ApiFailure> {
    let filter = RankingFilter {
        min_score: query.min_score,
        max_score: query.max_score,
    };
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let result = state
        .ranking
        .rank(filter, page, page_size)
        .await
        .map_err(error_response)?;

    Ok(Envelope::ok(result))
}

/// GET /trust/outliers - users outside the given score band
pub async fn get_outliers(
    State(state): State<TrustApiState>,
    Query(query): Query<OutlierQuery>,
) -> Result<Json<Envelope<Vec<UserTrustSummary>>>, ApiFailure> {
    let items = state
        .outliers
        .outliers(query.below, query.above)
        .await
        .map_err(error_response)?;

    Ok(Envelope::ok(items))
}

/// GET /users/{uid}/trust/breakdown - score with per-component inputs
pub async fn get_breakdown(
    State(state): State<TrustApiState>,
    Path(uid): Path<String>,
) -> Result<Json<Envelope<TrustBreakdown>>, ApiFailure> {
    let record = state
        .stats
        .get(&uid)
        .await
        .map_err(|e| error_response(TrustError::Store(e)))?
        .ok_or_else(|| error_response(TrustError::NotFound(uid.clone())))?;

    Ok(Envelope::ok(compose(&record)))
}

/// POST /users/{uid}/trust/recalculate - authoritative recompute with
/// audit trail. The acting admin's identity arrives in the `x-admin-id`
/// header set by the auth gate.
pub async fn post_recalculate(
    State(state): State<TrustApiState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Envelope<TrustScore>>, ApiFailure> {
    let admin_id = headers
        .get("x-admin-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            error_response(TrustError::validation("missing x-admin-id header"))
        })?;

    let score = state
        .recalc
        .recalculate(&uid, admin_id)
        .await
        .map_err(error_response)?;

    Ok(Envelope::ok(score))
}

/// Create the trust API router
pub fn create_trust_router(state: TrustApiState) -> Router {
    Router::new()
        .route("/trust/ranking", get(get_ranking))
        .route("/trust/outliers", get(get_outliers))
        .route("/users/{uid}/trust/breakdown", get(get_breakdown))
        .route("/users/{uid}/trust/recalculate", post(post_recalculate))
        .with_state(state)
}
