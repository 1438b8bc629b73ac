//! Integration tests for the trust score engine
//!
//! Exercises the ranking, outlier, breakdown, and recalculation flows
//! end to end over an in-memory store implementing the same ports the
//! PostgreSQL adapters implement.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use ridelink_admin::trust::{
    calculate, compose, AuditSink, ListQuery, OutlierService, RankingFilter, RankingService,
    RecalculationOrchestrator, RoleStats, ScoreOrder, ScoreSelection, ScoreStore, StatsSource,
    TrustCategory, TrustError, TrustScoreSnapshot, UserStatsRecord,
};

// ============================================================================
// Test Helpers
// ============================================================================

struct MemoryStore {
    records: Mutex<HashMap<String, UserStatsRecord>>,
    fail_recompute: AtomicBool,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_recompute: AtomicBool::new(false),
        }
    }

    fn seed(&self, record: UserStatsRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.uid.clone(), record);
    }
}

fn matches(score: i64, selection: &ScoreSelection) -> bool {
    match *selection {
        ScoreSelection::All => true,
        ScoreSelection::Range { min, max } => {
            min.map_or(true, |m| score >= m as i64) && max.map_or(true, |m| score <= m as i64)
        }
        ScoreSelection::Outside { below, above } => {
            below.map_or(false, |b| score < b as i64) || above.map_or(false, |a| score > a as i64)
        }
    }
}

#[async_trait]
impl StatsSource for MemoryStore {
    async fn get(&self, uid: &str) -> anyhow::Result<Option<UserStatsRecord>> {
        Ok(self.records.lock().unwrap().get(uid).cloned())
    }

    async fn list(&self, query: &ListQuery) -> anyhow::Result<(Vec<UserStatsRecord>, u64)> {
        let records = self.records.lock().unwrap();
        let mut selected: Vec<UserStatsRecord> = records
            .values()
            .filter(|r| matches(r.trust_score as i64, &query.selection))
            .cloned()
            .collect();

        match query.order {
            ScoreOrder::Descending => selected.sort_by(|a, b| b.trust_score.cmp(&a.trust_score)),
            ScoreOrder::Ascending => selected.sort_by(|a, b| a.trust_score.cmp(&b.trust_score)),
        }

        let total = selected.len() as u64;
        if let Some(window) = query.window {
            selected = selected
                .into_iter()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect();
        }
        Ok((selected, total))
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn recompute_authoritative(&self, uid: &str) -> anyhow::Result<i32> {
        if self.fail_recompute.load(Ordering::SeqCst) {
            anyhow::bail!("recompute routine unavailable");
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(uid)
            .ok_or_else(|| anyhow::anyhow!("no stats row for {}", uid))?;
        record.trust_score = calculate(record).total as i32;
        record.updated_at = Utc::now();
        Ok(record.trust_score)
    }
}

#[derive(Clone)]
struct AuditCapture {
    admin_id: String,
    action: String,
    entity_id: String,
    before: TrustScoreSnapshot,
    after: TrustScoreSnapshot,
}

struct MemoryAudit {
    entries: Mutex<Vec<AuditCapture>>,
}

impl MemoryAudit {
    fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    fn entries(&self) -> Vec<AuditCapture> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAudit {
    async fn record(
        &self,
        admin_id: &str,
        action: &str,
        _entity_type: &str,
        entity_id: &str,
        before: &TrustScoreSnapshot,
        after: &TrustScoreSnapshot,
    ) -> anyhow::Result<()> {
        self.entries.lock().unwrap().push(AuditCapture {
            admin_id: admin_id.to_string(),
            action: action.to_string(),
            entity_id: entity_id.to_string(),
            before: before.clone(),
            after: after.clone(),
        });
        Ok(())
    }
}

/// Create a stats record with configurable activity
fn create_record(
    uid: &str,
    rides: (u32, u32, u32),
    rating: (f64, u32),
    late: u32,
    no_shows: u32,
) -> UserStatsRecord {
    let (taken, completed, cancelled) = rides;
    let (avg, count) = rating;
    UserStatsRecord {
        uid: uid.to_string(),
        display_name: format!("User {}", uid),
        email: format!("{}@ridelink.test", uid),
        rider: RoleStats {
            rides_taken: taken,
            rides_completed: completed,
            rides_cancelled: cancelled,
            average_rating: avg,
            ratings_count: count,
        },
        passenger: RoleStats::default(),
        late_cancellations: late,
        no_shows,
        trust_score: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Seed a population with persisted scores already in place
fn seeded_population() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let profiles = [
        ("alice", 95),
        ("bob", 82),
        ("carol", 71),
        ("dave", 64),
        ("erin", 48),
        ("frank", 35),
        ("grace", 15),
    ];
    for (uid, score) in profiles {
        let mut record = create_record(uid, (0, 0, 0), (0.0, 0), 0, 0);
        record.trust_score = score;
        store.seed(record);
    }
    store
}

// ============================================================================
// Ranking Flow
// ============================================================================

mod ranking {
    use super::*;

    #[tokio::test]
    async fn test_unfiltered_ranking_covers_everyone_in_order() {
        let service = RankingService::new(seeded_population());

        let mut previous = i32::MAX;
        let mut seen = 0;
        for page in 1..=4 {
            let result = service
                .rank(RankingFilter::default(), page, 2)
                .await
                .unwrap();
            assert_eq!(result.total, 7);
            assert_eq!(result.total_pages, 4);
            for item in &result.items {
                assert!(item.trust_score <= previous, "scores must be non-increasing");
                previous = item.trust_score;
                seen += 1;
            }
        }
        assert_eq!(seen, 7);
    }

    #[tokio::test]
    async fn test_band_filter_and_categories() {
        let service = RankingService::new(seeded_population());

        let result = service
            .rank(
                RankingFilter {
                    min_score: Some(40),
                    max_score: Some(79),
                },
                1,
                50,
            )
            .await
            .unwrap();

        let uids: Vec<&str> = result.items.iter().map(|i| i.uid.as_str()).collect();
        assert_eq!(uids, vec!["carol", "dave", "erin"]);
        assert_eq!(result.items[0].category, TrustCategory::Good);
        assert_eq!(result.items[2].category, TrustCategory::Fair);
    }

    #[tokio::test]
    async fn test_invalid_filters_never_reach_the_store() {
        let service = RankingService::new(seeded_population());

        for (min, max) in [(Some(90), Some(10)), (Some(-5), None), (None, Some(200))] {
            let err = service
                .rank(
                    RankingFilter {
                        min_score: min,
                        max_score: max,
                    },
                    1,
                    50,
                )
                .await
                .unwrap_err();
            assert!(matches!(err, TrustError::Validation(_)));
        }
    }
}

// ============================================================================
// Outlier Flow
// ============================================================================

mod outliers {
    use super::*;

    #[tokio::test]
    async fn test_outliers_ascending_outside_band() {
        let service = OutlierService::new(seeded_population());

        let items = service.outliers(Some(40), Some(90)).await.unwrap();
        let scores: Vec<i32> = items.iter().map(|i| i.trust_score).collect();
        assert_eq!(scores, vec![15, 35, 95]);
    }

    #[tokio::test]
    async fn test_no_bounds_is_an_explicit_no_op() {
        let service = OutlierService::new(seeded_population());

        let items = service.outliers(None, None).await.unwrap();
        assert!(items.is_empty(), "no bounds must not return the population");
    }
}

// ============================================================================
// Breakdown / Calculator Agreement
// ============================================================================

mod breakdown {
    use super::*;

    #[tokio::test]
    async fn test_breakdown_always_agrees_with_calculator() {
        let records = [
            create_record("a", (0, 0, 0), (0.0, 0), 0, 0),
            create_record("b", (10, 10, 0), (5.0, 12), 0, 0),
            create_record("c", (8, 5, 3), (2.5, 4), 1, 1),
            create_record("d", (3, 1, 2), (4.9, 1), 0, 5),
        ];

        for record in &records {
            let b = compose(record);
            let s = calculate(record);
            assert_eq!(b.score.total, s.total);
            assert_eq!(b.score.category, s.category);
            assert_eq!(b.score.components, s.components);
        }
    }
}

// ============================================================================
// Recalculation Flow
// ============================================================================

mod recalculation {
    use super::*;

    #[tokio::test]
    async fn test_full_recalculation_flow_with_audit() {
        let store = Arc::new(MemoryStore::new());
        // Active rider, stale persisted score of 0
        store.seed(create_record("carol", (12, 11, 1), (4.6, 9), 0, 0));
        let audit = Arc::new(MemoryAudit::new());
        let orch = RecalculationOrchestrator::new(store.clone(), audit.clone());

        let score = orch.recalculate("carol", "admin_7").await.unwrap();

        // rating round(4.6*6)=28, completion round(11/12*25)=23,
        // reliability 25-2=23, experience 20 -> 94 Excellent
        assert_eq!(score.total, 94);
        assert_eq!(score.category, TrustCategory::Excellent);

        let persisted = store.get("carol").await.unwrap().unwrap();
        assert_eq!(persisted.trust_score, 94);

        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].admin_id, "admin_7");
        assert_eq!(entries[0].action, "trust.recalculate");
        assert_eq!(entries[0].entity_id, "carol");
        assert_eq!(entries[0].before.trust_score, 0);
        assert!(entries[0].before.components.is_none());
        assert_eq!(entries[0].after.trust_score, 94);
        assert_eq!(entries[0].after.components, Some(score.components));
    }

    #[tokio::test]
    async fn test_recalculation_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        store.seed(create_record("dave", (5, 4, 1), (3.8, 3), 1, 0));
        let audit = Arc::new(MemoryAudit::new());
        let orch = RecalculationOrchestrator::new(store, audit);

        let first = orch.recalculate("dave", "admin_1").await.unwrap();
        let second = orch.recalculate("dave", "admin_1").await.unwrap();
        assert_eq!(first.total, second.total);
        assert_eq!(first.components, second.components);
    }

    #[tokio::test]
    async fn test_failures_surface_with_the_right_taxonomy() {
        let store = Arc::new(MemoryStore::new());
        store.seed(create_record("erin", (1, 1, 0), (5.0, 1), 0, 0));
        let audit = Arc::new(MemoryAudit::new());
        let orch = RecalculationOrchestrator::new(store.clone(), audit.clone());

        let err = orch.recalculate("nobody", "admin_1").await.unwrap_err();
        assert!(matches!(err, TrustError::NotFound(_)));

        store.fail_recompute.store(true, Ordering::SeqCst);
        let err = orch.recalculate("erin", "admin_1").await.unwrap_err();
        assert!(matches!(err, TrustError::RecalculationFailed(_)));
        assert!(audit.entries().is_empty());
    }
}
