//! User Stats Repository
//!
//! Reads activity stats rows and hosts the authoritative recompute
//! routine as an in-store SQL function, so the persisted `trust_score`
//! has exactly one writer and it lives next to the data.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::{QueryBuilder, Row};
use tracing::info;

use crate::trust::{
    ListQuery, RoleStats, ScoreOrder, ScoreSelection, ScoreStore, StatsSource, UserStatsRecord,
};

pub struct UserStatsRepository {
    pool: PgPool,
}

const STATS_COLUMNS: &str = "uid, display_name, email, \
     rider_rides_taken, rider_rides_completed, rider_rides_cancelled, \
     rider_avg_rating, rider_ratings_count, \
     passenger_rides_taken, passenger_rides_completed, passenger_rides_cancelled, \
     passenger_avg_rating, passenger_ratings_count, \
     late_cancellations, no_shows, trust_score, created_at, updated_at";

impl UserStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the stats table, indexes, and the recompute routine.
    pub async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.user_stats (
                uid VARCHAR(255) PRIMARY KEY,
                display_name VARCHAR(255) NOT NULL DEFAULT '',
                email VARCHAR(255) NOT NULL DEFAULT '',
                rider_rides_taken INTEGER NOT NULL DEFAULT 0,
                rider_rides_completed INTEGER NOT NULL DEFAULT 0,
                rider_rides_cancelled INTEGER NOT NULL DEFAULT 0,
                rider_avg_rating DOUBLE PRECISION NOT NULL DEFAULT 0.0,
                rider_ratings_count INTEGER NOT NULL DEFAULT 0,
                passenger_rides_taken INTEGER NOT NULL DEFAULT 0,
                passenger_rides_completed INTEGER NOT NULL DEFAULT 0,
                passenger_rides_cancelled INTEGER NOT NULL DEFAULT 0,
                passenger_avg_rating DOUBLE PRECISION NOT NULL DEFAULT 0.0,
                passenger_ratings_count INTEGER NOT NULL DEFAULT 0,
                late_cancellations INTEGER NOT NULL DEFAULT 0,
                no_shows INTEGER NOT NULL DEFAULT 0,
                trust_score INTEGER NOT NULL DEFAULT 0
                    CHECK (trust_score BETWEEN 0 AND 100),
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_stats table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_user_stats_score \
             ON trust.user_stats(trust_score)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_stats score index")?;

        // The single writer of trust_score. Mirrors the component
        // formulas in trust::score; the Rust side only derives for
        // display and audit diffing.
        sqlx::query(
            r#"
            CREATE OR REPLACE FUNCTION trust.recompute_score(p_uid VARCHAR)
            RETURNS INTEGER AS $$
            DECLARE
                rec trust.user_stats%ROWTYPE;
                v_total_rides INTEGER;
                v_completed INTEGER;
                v_cancelled INTEGER;
                v_total_ratings INTEGER;
                v_avg_rating DOUBLE PRECISION;
                v_rating INTEGER;
                v_completion INTEGER;
                v_reliability INTEGER;
                v_experience INTEGER;
                v_score INTEGER;
            BEGIN
                SELECT * INTO rec FROM trust.user_stats WHERE uid = p_uid;
                IF NOT FOUND THEN
                    RAISE EXCEPTION 'no stats row for user %', p_uid;
                END IF;

                v_total_rides := rec.rider_rides_taken + rec.passenger_rides_taken;
                v_completed := rec.rider_rides_completed + rec.passenger_rides_completed;
                v_cancelled := rec.rider_rides_cancelled + rec.passenger_rides_cancelled;
                v_total_ratings := rec.rider_ratings_count + rec.passenger_ratings_count;

                IF v_total_ratings = 0 THEN
                    v_rating := 15;
                ELSE
                    v_avg_rating := (rec.rider_avg_rating * rec.rider_ratings_count
                                   + rec.passenger_avg_rating * rec.passenger_ratings_count)
                                  / v_total_ratings;
                    v_rating := LEAST(ROUND(v_avg_rating * 6)::INTEGER, 30);
                END IF;

                IF v_total_rides = 0 THEN
                    v_completion := 20;
                ELSE
                    v_completion := LEAST(
                        ROUND(v_completed::DOUBLE PRECISION / v_total_rides * 25)::INTEGER,
                        25
                    );
                END IF;

                v_reliability := GREATEST(
                    25 - (v_cancelled * 2 + rec.late_cancellations * 5 + rec.no_shows * 10),
                    0
                );

                IF v_total_rides = 0 THEN
                    v_experience := 10;
                ELSIF v_total_rides >= 10 THEN
                    v_experience := 20;
                ELSE
                    v_experience := 10 + v_total_rides;
                END IF;

                v_score := LEAST(v_rating + v_completion + v_reliability + v_experience, 100);

                UPDATE trust.user_stats
                SET trust_score = v_score, updated_at = NOW()
                WHERE uid = p_uid;

                RETURN v_score;
            END;
            $$ LANGUAGE plpgsql
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create recompute_score function")?;

        info!("User stats schema initialized");
        Ok(())
    }

    fn record_from_row(row: &sqlx::postgres::PgRow) -> UserStatsRecord {
        UserStatsRecord {
            uid: row.get("uid"),
            display_name: row.get("display_name"),
            email: row.get("email"),
            rider: RoleStats {
                rides_taken: row.get::<i32, _>("rider_rides_taken") as u32,
                rides_completed: row.get::<i32, _>("rider_rides_completed") as u32,
                rides_cancelled: row.get::<i32, _>("rider_rides_cancelled") as u32,
                average_rating: row.get("rider_avg_rating"),
                ratings_count: row.get::<i32, _>("rider_ratings_count") as u32,
            },
            passenger: RoleStats {
                rides_taken: row.get::<i32, _>("passenger_rides_taken") as u32,
                rides_completed: row.get::<i32, _>("passenger_rides_completed") as u32,
                rides_cancelled: row.get::<i32, _>("passenger_rides_cancelled") as u32,
                average_rating: row.get("passenger_avg_rating"),
                ratings_count: row.get::<i32, _>("passenger_ratings_count") as u32,
            },
            late_cancellations: row.get::<i32, _>("late_cancellations") as u32,
            no_shows: row.get::<i32, _>("no_shows") as u32,
            trust_score: row.get("trust_score"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        }
    }

    fn push_selection(qb: &mut QueryBuilder<'_, sqlx::Postgres>, selection: &ScoreSelection) {
        match *selection {
            ScoreSelection::All => {}
            ScoreSelection::Range { min, max } => {
                let mut prefix = " WHERE ";
                if let Some(min) = min {
                    qb.push(prefix).push("trust_score >= ").push_bind(min as i32);
                    prefix = " AND ";
                }
                if let Some(max) = max {
                    qb.push(prefix).push("trust_score <= ").push_bind(max as i32);
                }
            }
            ScoreSelection::Outside { below, above } => match (below, above) {
                (Some(below), Some(above)) => {
                    qb.push(" WHERE (trust_score < ")
                        .push_bind(below as i32)
                        .push(" OR trust_score > ")
                        .push_bind(above as i32)
                        .push(")");
                }
                (Some(below), None) => {
                    qb.push(" WHERE trust_score < ").push_bind(below as i32);
                }
                (None, Some(above)) => {
                    qb.push(" WHERE trust_score > ").push_bind(above as i32);
                }
                // Services turn this into an explicit empty result before
                // reaching the store; match that if one ever arrives.
                (None, None) => {
                    qb.push(" WHERE FALSE");
                }
            },
        }
    }
}

#[async_trait]
impl StatsSource for UserStatsRepository {
    async fn get(&self, uid: &str) -> anyhow::Result<Option<UserStatsRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM trust.user_stats WHERE uid = $1",
            STATS_COLUMNS
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user stats")?;

        Ok(row.as_ref().map(Self::record_from_row))
    }

    async fn list(&self, query: &ListQuery) -> anyhow::Result<(Vec<UserStatsRecord>, u64)> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM trust.user_stats");
        Self::push_selection(&mut count_qb, &query.selection);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count user stats")?;

        let mut qb = QueryBuilder::new(format!("SELECT {} FROM trust.user_stats", STATS_COLUMNS));
        Self::push_selection(&mut qb, &query.selection);
        qb.push(match query.order {
            ScoreOrder::Descending => " ORDER BY trust_score DESC",
            ScoreOrder::Ascending => " ORDER BY trust_score ASC",
        });
        if let Some(window) = query.window {
            qb.push(" LIMIT ")
                .push_bind(window.limit as i64)
                .push(" OFFSET ")
                .push_bind(window.offset as i64);
        }

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list user stats")?;

        let records = rows.iter().map(Self::record_from_row).collect();
        Ok((records, total as u64))
    }
}

#[async_trait]
impl ScoreStore for UserStatsRepository {
    async fn recompute_authoritative(&self, uid: &str) -> anyhow::Result<i32> {
        let score: i32 = sqlx::query_scalar("SELECT trust.recompute_score($1)")
            .bind(uid)
            .fetch_one(&self.pool)
            .await
            .context("Authoritative recompute routine failed")?;

        Ok(score)
    }
}
